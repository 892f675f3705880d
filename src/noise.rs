/// Frame length as a power of two: one frame every 32 ms
pub const MS_PER_FRAME_POW2: u32 = 5;

const NOISE_LEN: usize = 256;

/// Fixed noise table, generated at compile time with an xorshift
const NOISE: [u8; NOISE_LEN] = build_noise_table(0x9e37_79b9);

const fn build_noise_table(seed: u32) -> [u8; NOISE_LEN] {
    let mut table = [0u8; NOISE_LEN];
    let mut state = seed;
    let mut i = 0;
    while i < NOISE_LEN {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        table[i] = (state >> 24) as u8;
        i += 1;
    }
    table
}

/// Cheap pseudo-random byte source for raindrop timing and placement.
///
/// A rolling offset walks the noise table while the frame-resolution clock
/// skews every read, so the sequence never lines up with the table period.
/// Not suitable for anything but looking irregular.
#[derive(Debug, Clone, Default)]
pub struct NoiseSource {
    offset: u8,
}

impl NoiseSource {
    pub fn new() -> Self {
        Self { offset: 0 }
    }

    /// Next byte, skewed by the current clock reading
    pub fn next(&mut self, now_ms: u64) -> u8 {
        self.offset = self.offset.wrapping_add(1);
        let frame = (now_ms >> MS_PER_FRAME_POW2) as u8;
        frame.wrapping_add(NOISE[self.offset as usize])
    }
}
