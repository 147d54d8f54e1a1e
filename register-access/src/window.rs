use core::{ptr::NonNull, slice};

use vcell::VolatileCell;

/// A block of 32-bit memory-mapped registers.
///
/// Accesses take `&self`. Callers that need read-modify-write atomicity provide their own
/// lock.
pub trait RegisterWindow {
    fn read32(&self, offset: usize) -> u32;
    fn write32(&self, offset: usize, value: u32);
}

/// Volatile accessor for a mapped register window.
pub struct MmioWindow<'a> {
    registers: &'a [VolatileCell<u32>],
}

impl<'a> MmioWindow<'a> {
    pub fn new(registers: &'a [VolatileCell<u32>]) -> Self {
        Self { registers }
    }

    /// # Safety
    ///
    /// `base` must point to `size` bytes of mapped device memory that stays mapped for
    /// `'a`, and nothing else may assume ownership of it.
    pub unsafe fn from_raw(base: NonNull<u32>, size: usize) -> Self {
        let registers = slice::from_raw_parts(base.as_ptr().cast::<VolatileCell<u32>>(), size / 4);
        Self::new(registers)
    }

    /// Window length in bytes.
    pub fn size(&self) -> usize {
        self.registers.len() * 4
    }

    fn register(&self, offset: usize) -> &VolatileCell<u32> {
        assert!(offset % 4 == 0, "unaligned register offset {offset:#x}");
        &self.registers[offset / 4]
    }
}

impl RegisterWindow for MmioWindow<'_> {
    fn read32(&self, offset: usize) -> u32 {
        self.register(offset).get()
    }

    fn write32(&self, offset: usize, value: u32) {
        self.register(offset).set(value)
    }
}

impl<W: RegisterWindow> RegisterWindow for &W {
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        (**self).write32(offset, value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn memory<const N: usize>() -> [VolatileCell<u32>; N] {
        core::array::from_fn(|_| VolatileCell::new(0))
    }

    #[test]
    fn accesses_are_word_sized() {
        let memory = memory::<4>();
        let window = MmioWindow::new(&memory);

        window.write32(4, 0xDEAD_BEEF);
        (&window).write32(12, 1);

        assert_eq!(window.read32(4), 0xDEAD_BEEF);
        assert_eq!(window.read32(0), 0);
        assert_eq!(window.size(), 16);

        let values: Vec<u32> = memory.iter().map(VolatileCell::get).collect();
        assert_eq!(values, [0, 0xDEAD_BEEF, 0, 1]);
    }

    #[test]
    fn raw_window_covers_whole_words() {
        let mut memory = [0u32; 3];
        let window = unsafe { MmioWindow::from_raw(NonNull::from(&mut memory).cast(), 11) };

        assert_eq!(window.size(), 8);
        window.write32(4, 7);
        assert_eq!(memory[1], 7);
    }

    #[test]
    #[should_panic]
    fn access_past_the_end_panics() {
        let memory = memory::<2>();
        let window = MmioWindow::new(&memory);

        window.read32(8);
    }

    #[test]
    #[should_panic]
    fn unaligned_access_panics() {
        let memory = memory::<2>();
        let window = MmioWindow::new(&memory);

        window.write32(2, 1);
    }
}
