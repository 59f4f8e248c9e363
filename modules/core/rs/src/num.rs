use std::fmt::Debug;

/// T values are primitive integers
pub trait PrimInt: ::num::PrimInt + Debug + Default {}
impl<T: ::num::PrimInt + Debug + Default> PrimInt for T {}

/// T values are non-negative primitive integers, e.g. genomic coordinates or run lengths
pub trait PrimUInt: PrimInt + ::num::Unsigned {}

impl<T: PrimInt + ::num::Unsigned> PrimUInt for T {}
