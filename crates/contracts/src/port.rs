//! Sample ports - non-blocking inputs and outputs of the periodic cycle

use crate::ContractError;

/// Latest-value input port.
///
/// Reads never block: a port either holds a sample not yet read or it does
/// not. Intermediate samples overwritten before a read are lost.
pub trait SampleInput<T>: Send {
    /// A sample arrived since the last read
    fn has_new(&self) -> bool;

    /// Take the freshest sample if it is new, marking it as read
    fn read_new(&mut self) -> Option<T>;

    /// Mark any pending sample as read without using it.
    ///
    /// Returns `true` if a sample was discarded.
    fn discard(&mut self) -> bool {
        self.read_new().is_some()
    }
}

/// Output port for debug samples.
pub trait OutputPort<T>: Send {
    /// Port name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Push one sample
    ///
    /// # Errors
    /// Returns write error (should include context)
    fn write(&mut self, sample: T) -> Result<(), ContractError>;
}
