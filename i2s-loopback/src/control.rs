/// Trait for the analog side of the loopback (e.g., a codec chip between the
/// I²S pins and the jack).
///
/// The self-test itself never calls this; boards that route the stream
/// through a codec bring it up before [`StreamController::run`].
///
/// [`StreamController::run`]: crate::stream::StreamController::run
pub trait AudioControl {
    /// Bus error of the control interface.
    type Error;

    /// Power up both conversion paths.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Power down both conversion paths.
    fn disable(&mut self) -> Result<(), Self::Error>;

    /// Set the output level from 0.0 (silent) to 1.0 (full scale).
    fn volume(&mut self, level: f32) -> Result<(), Self::Error>;
}
