/*!
Optimization over weak constraints.

Each ground instance of a weak constraint `:~ body. [w@l, terms]` is represented by an atom, which holds exactly when the body holds.
The weight of an assignment is the sum, at each level, of the weights of the weak constraint atoms which hold, kept as a [WeightAtLevels].

Optimization is branch-and-bound:
- The [WeakConstraintsManager] tracks the weight of the current assignment through callbacks on the atoms of weak constraints.
- Whenever the current weight is not better than the best known weight, the search is pruned with the [excluding nogood](WeakConstraintsManager::excluding_nogood).
- When an answer set is found, its weight becomes the best known weight, and the search continues.

So, each answer set found has a weight strictly better than every answer set found before.
*/

mod weights;
pub use weights::WeightAtLevels;

mod weak;
pub use weak::WeakConstraintsManager;
