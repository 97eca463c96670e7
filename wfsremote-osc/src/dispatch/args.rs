//! Typed extraction of handler arguments.
//!
//! A handler registered for `(i32, f32)` only ever sees messages carrying
//! exactly one int followed by one float.

use wfsremote_common::models::OscArgument;

use super::ValidationError;

/// A single argument type a handler can ask for.
pub trait FromOscArg: Sized {
    const TAG: char;

    fn from_osc_arg(arg: &OscArgument) -> Option<Self>;
}

impl FromOscArg for i32 {
    const TAG: char = 'i';

    fn from_osc_arg(arg: &OscArgument) -> Option<Self> {
        match arg {
            OscArgument::Int32(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromOscArg for f32 {
    const TAG: char = 'f';

    fn from_osc_arg(arg: &OscArgument) -> Option<Self> {
        match arg {
            OscArgument::Float32(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromOscArg for String {
    const TAG: char = 's';

    fn from_osc_arg(arg: &OscArgument) -> Option<Self> {
        match arg {
            OscArgument::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}

/// The full argument list of a message, checked for arity and types.
pub trait FromOscArgs: Sized {
    fn from_osc_args(args: &[OscArgument]) -> Result<Self, ValidationError>;
}

impl FromOscArgs for () {
    fn from_osc_args(args: &[OscArgument]) -> Result<Self, ValidationError> {
        if args.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Arity {
                expected: "0".into(),
                found: args.len(),
            })
        }
    }
}

/// Zero or one argument of the given type.
impl<T: FromOscArg> FromOscArgs for Option<T> {
    fn from_osc_args(args: &[OscArgument]) -> Result<Self, ValidationError> {
        match args {
            [] => Ok(None),
            [arg] => extract::<T>(arg, 0).map(Some),
            _ => Err(ValidationError::Arity {
                expected: "0 or 1".into(),
                found: args.len(),
            }),
        }
    }
}

fn extract<T: FromOscArg>(arg: &OscArgument, index: usize) -> Result<T, ValidationError> {
    T::from_osc_arg(arg).ok_or(ValidationError::ArgumentType {
        index,
        expected: T::TAG,
        found: arg.type_tag(),
    })
}

macro_rules! impl_from_osc_args {
    ($len:expr; $($idx:tt => $ty:ident),+) => {
        impl<$($ty: FromOscArg),+> FromOscArgs for ($($ty,)+) {
            fn from_osc_args(args: &[OscArgument]) -> Result<Self, ValidationError> {
                if args.len() != $len {
                    return Err(ValidationError::Arity {
                        expected: $len.to_string(),
                        found: args.len(),
                    });
                }
                Ok(($(extract::<$ty>(&args[$idx], $idx)?,)+))
            }
        }
    };
}

impl_from_osc_args!(1; 0 => A);
impl_from_osc_args!(2; 0 => A, 1 => B);
impl_from_osc_args!(3; 0 => A, 1 => B, 2 => C);
impl_from_osc_args!(4; 0 => A, 1 => B, 2 => C, 3 => D);
