use crate::context::ContextState;

/// A configurable value, with bounds and the last state of a context in which the value may be revised.
#[derive(Clone, Debug)]
pub struct ConfigOption<T> {
    pub name: &'static str,
    pub min: T,
    pub max: T,
    pub max_state: ContextState,
    pub value: T,
}

impl<T: Clone> ConfigOption<T> {
    pub fn min_max(&self) -> (T, T) {
        (self.min.clone(), self.max.clone())
    }
}

impl<T: Clone + PartialOrd> ConfigOption<T> {
    /// Sets the value of the option, if within bounds.
    ///
    /// Returns true if the value was set.
    pub fn set(&mut self, value: T) -> bool {
        if value < self.min || self.max < value {
            return false;
        }
        self.value = value;
        true
    }
}
