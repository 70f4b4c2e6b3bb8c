/*!
Propagation over the nogoods of a context.

Propagation itself is made by the [nogood database](crate::db::nogood), from the events on the trail of the assignment.
After propagation, the weight of violated weak constraints is brought in line with the assignment, as weak constraint atoms may have changed value through propagation or backjumping.
*/

use crate::{context::GenericContext, db::NoGoodKey, types::err::ErrorKind};

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Propagates each event on the trail, and syncs the weight of weak constraints.
    ///
    /// Returns the key of a violated nogood, if some nogood is violated.
    pub fn propagate(&mut self) -> Result<Option<NoGoodKey>, ErrorKind> {
        let conflict = self.nogood_db.propagate(&mut self.assignment)?;
        self.weak.sync(&mut self.assignment);
        Ok(conflict)
    }
}
