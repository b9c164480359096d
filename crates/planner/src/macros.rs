/// Builds a [`QuerySpec`](crate::spec::QuerySpec) inline.
///
/// ```ignore
/// let spec = query_spec! {
///     "name" => "hlogeon",
///     "deleted_at" => null,
///     "Company" => { "name" => "Codegyre" },
/// };
/// ```
///
/// Values are single token trees; wrap anything longer (e.g. `(-5)`) in
/// parentheses.
#[macro_export]
macro_rules! query_spec {
    (@value null) => {
        $crate::spec::SpecValue::Null
    };
    (@value { $($inner:tt)* }) => {
        $crate::spec::SpecValue::Nested($crate::query_spec!($($inner)*))
    };
    (@value $value:expr) => {
        $crate::spec::SpecValue::from($value)
    };
    ($($key:expr => $value:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut spec = $crate::spec::QuerySpec::new();
        $( spec.insert($key, $crate::query_spec!(@value $value)); )*
        spec
    }};
}
