/// # Timers
/// Two 8-bit countdown timers (delay & sound).
///
/// Each is decremented once per `tick` while above zero and never wraps. How often `tick` is
/// called is up to the host; conventionally that's 60Hz regardless of the instruction rate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timers {
    pub delay: u8,
    pub sound: u8,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// A tone should be playing while the sound timer is running
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}
