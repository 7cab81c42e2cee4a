use std::str::FromStr;

/// Strips leading and trailing whitespace from `input` and parses the rest as a `T`.
pub fn strip_and_parse_number<T>(input: &str) -> Result<T, T::Err>
where
    T: FromStr,
    T::Err: std::error::Error,
{
    input.trim().parse::<T>()
}

/// Parses exactly `N` comma-separated numbers.
pub fn parse_list<T, const N: usize>(input: &str) -> Option<[T; N]>
where
    T: FromStr + Copy + Default,
    T::Err: std::error::Error,
{
    let mut result = [T::default(); N];
    let mut parts = input.split(',');
    for slot in result.iter_mut() {
        *slot = strip_and_parse_number(parts.next()?).ok()?;
    }
    match parts.next() {
        Some(_) => None,
        None => Some(result),
    }
}
