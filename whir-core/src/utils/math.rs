pub trait Math {
    fn pow2(self) -> usize;
    fn log_2(self) -> usize;
    /// Number of bytes needed to hold `self` bits.
    fn bytes_for_bits(self) -> usize;
}

impl Math for usize {
    #[inline]
    fn pow2(self) -> usize {
        1usize << self
    }

    /// Ceiling of `log2`.
    fn log_2(self) -> usize {
        assert_ne!(self, 0);
        if self.is_power_of_two() {
            self.trailing_zeros() as usize
        } else {
            (usize::BITS - self.leading_zeros()) as usize
        }
    }

    #[inline]
    fn bytes_for_bits(self) -> usize {
        self.div_ceil(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_2_rounds_up() {
        assert_eq!(1usize.log_2(), 0);
        assert_eq!(8usize.log_2(), 3);
        assert_eq!(9usize.log_2(), 4);
        assert_eq!(0usize.bytes_for_bits(), 0);
        assert_eq!(9usize.bytes_for_bits(), 2);
    }
}
