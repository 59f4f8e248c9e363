/// A trait representing the concept of identity for run-length encoding.
/// This trait is used to determine whether two values should be considered as part of the same run.
pub trait Identical<T> {
    /// Returns `true` if the two values should be considered part of the same run.
    /// Note that no guarantees are made about which of the two values will be kept in the run.
    fn identical(&self, first: &T, second: &T) -> bool;
}

/// Any function that takes two references to `T` and returns a `bool` is a valid identity.
impl<T, F> Identical<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn identical(&self, first: &T, second: &T) -> bool {
        self(first, second)
    }
}
