//! Inter-satellite information sharing.

use st_core::SatResult;

use crate::Satellite;

/// Models how satellites share what they know.
///
/// Reset once per episode; [`communicate`](Self::communicate) runs once per
/// step after every data store has been updated and before the reward is
/// computed.
pub trait Communicator: Send {
    fn reset(&mut self) -> SatResult<()> {
        Ok(())
    }

    fn communicate(&mut self, _satellites: &mut [Box<dyn Satellite>]) -> SatResult<()> {
        Ok(())
    }
}

/// Satellites never exchange information.
pub struct NoCommunication;

impl Communicator for NoCommunication {}
