//! Typed path parameter extraction.
//!
//! A [`ResolvedRoute`](crate::resolver::ResolvedRoute) stores parameters as
//! strings. The traits here parse them into typed values, either the whole
//! parameter list at once ([`FromPath`], including tuples) or one value at
//! a given position ([`SingleFromPath`]).

use std::collections::HashMap;
use std::ops::Deref;

use crate::error::PathError;

/// Context for parameter extraction.
///
/// Contains both named parameters and the positional values in the order
/// their placeholders appear in the template.
#[derive(Debug, Clone, Default)]
pub struct ParamContext {
	pub(crate) params: HashMap<String, String>,
	pub(crate) param_values: Vec<String>,
	pub(crate) param_names: Vec<String>,
}

impl ParamContext {
	/// Creates a new parameter context.
	pub fn new(params: HashMap<String, String>, param_values: Vec<String>) -> Self {
		Self {
			params,
			param_values,
			param_names: Vec::new(),
		}
	}

	/// Sets the parameter names in placeholder order.
	///
	/// Parse errors from [`ParamContext::parse`] report the position of the
	/// name in this list.
	pub fn with_param_names(mut self, names: Vec<String>) -> Self {
		self.param_names = names;
		self
	}

	/// Returns the raw value of a named parameter.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Returns the number of positional parameters.
	pub fn len(&self) -> usize {
		self.param_values.len()
	}

	/// Returns whether there are no positional parameters.
	pub fn is_empty(&self) -> bool {
		self.param_values.is_empty()
	}

	/// Parses a named parameter.
	///
	/// # Errors
	///
	/// Returns [`PathError::Missing`] if the parameter is absent and
	/// [`PathError::ParseError`] if it does not parse as `T`.
	pub fn parse<T>(&self, name: &str) -> Result<T, PathError>
	where
		T: std::str::FromStr,
		T::Err: std::fmt::Display,
	{
		let raw = self
			.params
			.get(name)
			.ok_or_else(|| PathError::Missing(name.to_string()))?;
		let index = if self.param_names.is_empty() {
			self.param_values
				.iter()
				.position(|v| v == raw)
				.unwrap_or_default()
		} else {
			self.param_names
				.iter()
				.position(|n| n == name)
				.unwrap_or_default()
		};
		parse_value(raw, index)
	}
}

fn parse_value<T>(raw: &str, index: usize) -> Result<T, PathError>
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	raw.parse::<T>().map_err(|e| PathError::ParseError {
		param_index: index,
		param_type: std::any::type_name::<T>(),
		raw_value: raw.to_string(),
		message: e.to_string(),
	})
}

/// Trait for extracting typed values from the full parameter list.
pub trait FromPath: Sized {
	/// Extracts Self from the parameter context.
	///
	/// # Errors
	///
	/// Returns [`PathError::CountMismatch`] if the number of parameters doesn't match.
	/// Returns [`PathError::ParseError`] if parameter parsing fails.
	fn from_path(ctx: &ParamContext) -> Result<Self, PathError>;
}

/// Path parameter extractor.
///
/// # Example
///
/// ```ignore
/// let Path((project_id, stage)) = resolved.extract::<Path<(u64, String)>>()?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
	/// Unwraps the inner value.
	pub fn into_inner(self) -> T {
		self.0
	}
}

impl<T> Deref for Path<T> {
	type Target = T;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

// Macro for implementing FromPath for single-valued types
macro_rules! impl_from_path_for_scalar {
	($($ty:ty),* $(,)?) => {
		$(
			impl FromPath for $ty {
				fn from_path(ctx: &ParamContext) -> Result<Self, PathError> {
					if ctx.param_values.len() != 1 {
						return Err(PathError::CountMismatch {
							expected: 1,
							actual: ctx.param_values.len(),
						});
					}
					parse_value(&ctx.param_values[0], 0)
				}
			}
		)*
	};
}

impl_from_path_for_scalar!(i32, i64, u32, u64, bool, String);

impl<T: FromPath> FromPath for Path<T> {
	fn from_path(ctx: &ParamContext) -> Result<Self, PathError> {
		T::from_path(ctx).map(Path)
	}
}

/// Trait for extracting a single value at a specific index.
pub trait SingleFromPath: Sized {
	/// Extracts a single value at the given index.
	fn from_path_at(ctx: &ParamContext, index: usize) -> Result<Self, PathError>;
}

impl<T> SingleFromPath for T
where
	T: std::str::FromStr,
	T::Err: std::fmt::Display,
{
	fn from_path_at(ctx: &ParamContext, index: usize) -> Result<Self, PathError> {
		let raw = ctx
			.param_values
			.get(index)
			.ok_or(PathError::CountMismatch {
				expected: index + 1,
				actual: ctx.param_values.len(),
			})?;
		parse_value(raw, index)
	}
}

// Macro for implementing FromPath for tuples
macro_rules! impl_from_path_for_tuple {
	($count:expr; $($idx:tt => $ty:ident),+ $(,)?) => {
		impl<$($ty),+> FromPath for ($($ty,)+)
		where
			$($ty: std::str::FromStr,)+
			$(<$ty as std::str::FromStr>::Err: std::fmt::Display,)+
		{
			fn from_path(ctx: &ParamContext) -> Result<Self, PathError> {
				if ctx.param_values.len() != $count {
					return Err(PathError::CountMismatch {
						expected: $count,
						actual: ctx.param_values.len(),
					});
				}

				Ok((
					$(<$ty as SingleFromPath>::from_path_at(ctx, $idx)?,)+
				))
			}
		}
	};
}

impl_from_path_for_tuple!(2; 0 => A, 1 => B);
impl_from_path_for_tuple!(3; 0 => A, 1 => B, 2 => C);
impl_from_path_for_tuple!(4; 0 => A, 1 => B, 2 => C, 3 => D);
