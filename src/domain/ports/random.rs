/// Pseudo random source, the `rand()` of the platform.
pub trait Random {
    fn next_u32(&mut self) -> u32;

    /// Non-negative value in `0..=i32::MAX`, like C `rand()`.
    fn random(&mut self) -> i32 {
        (self.next_u32() >> 1).cast_signed()
    }
}

impl<T: Random + ?Sized> Random for &mut T {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }
}
