//! Type mapping resolver
//!
//! Shared driver behind every adapter's `resolve_type`: handles `SETOF`,
//! array suffixes, precision extraction, presentation modes and the
//! user-defined fallback. Adapters only supply a lookup from a normalized
//! native name to its [`NativeType`].

use crate::names::Initialisms;
use schemagraph_types::TypeMode;
use serde::Serialize;

/// Target type produced for a native type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedType {
    /// Target type expression, e.g. `i32`, `Option<String>`, `Vec<u8>`.
    pub name: String,
    /// Zero-value expression for `name`.
    pub zero: String,
    /// Declared precision / length, when the descriptor carried one.
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

impl ResolvedType {
    pub fn new(name: impl Into<String>, zero: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zero: zero.into(),
            precision: None,
            scale: None,
        }
    }
}

/// Everything a resolution depends on besides the descriptor itself.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    /// Active schema; `schema.name` descriptors in it are treated as local types.
    pub schema: &'a str,
    pub mode: TypeMode,
    pub int32_type: &'a str,
    pub uint32_type: &'a str,
    pub names: &'a Initialisms,
}

/// A type name together with its zero value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repr {
    pub name: String,
    pub zero: String,
}

impl Repr {
    pub fn new(name: impl Into<String>, zero: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zero: zero.into(),
        }
    }
}

/// How one native type maps into each target family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// Plain representation used by the standard family.
    pub standard: Repr,
    /// Representation the driver decodes into internally.
    pub internal: Repr,
    /// Driver-native wrapper that carries its own null state, if any.
    pub wrapper: Option<&'static str>,
}

impl NativeType {
    /// Same representation in every family, no wrapper.
    pub fn plain(name: impl Into<String>, zero: impl Into<String>) -> Self {
        let repr = Repr::new(name, zero);
        Self {
            standard: repr.clone(),
            internal: repr,
            wrapper: None,
        }
    }

    pub fn wrapped(mut self, wrapper: &'static str) -> Self {
        self.wrapper = Some(wrapper);
        self
    }

    pub fn internal(mut self, name: impl Into<String>, zero: impl Into<String>) -> Self {
        self.internal = Repr::new(name, zero);
        self
    }
}

/// Declared precision and scale, as parsed from a descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Precision {
    pub precision: Option<u32>,
    pub scale: Option<u32>,
}

/// Lookup from a normalized native type name to its mapping.
pub type NativeLookup<'f> = &'f dyn Fn(&str, Precision, &TypeContext<'_>) -> Option<NativeType>;

/// Dedicated collection type for arrays of strings.
pub const STRING_LIST: &str = "StringList";

/// Resolve `native` the way every adapter does, using `lookup` for the
/// engine-specific vocabulary.
pub fn resolve_native(
    ctx: &TypeContext<'_>,
    native: &str,
    nullable: bool,
    lookup: NativeLookup<'_>,
) -> ResolvedType {
    let native = native.trim();

    if let Some(element) = strip_prefix_ignore_case(native, "SETOF ") {
        let element = resolve_native(ctx, element.trim(), false, lookup);
        return ResolvedType::new(format!("Vec<{}>", element.name), "Vec::new()");
    }

    let (descriptor, array) = match native.strip_suffix("[]") {
        Some(element) => (element.trim_end(), true),
        None => (native, false),
    };
    let (descriptor, precision) = parse_precision(descriptor);

    // array elements are never individually nullable
    let nullable = nullable && !array;

    let repr = match lookup(&descriptor.to_lowercase(), precision, ctx) {
        Some(native) => present(ctx.mode, &native, nullable),
        None => fallback(ctx, &descriptor, nullable),
    };

    let repr = if array && repr.name == "String" {
        Repr::new(STRING_LIST, format!("{STRING_LIST}::default()"))
    } else if array {
        Repr::new(format!("Vec<{}>", repr.name), "Vec::new()")
    } else {
        repr
    };

    ResolvedType {
        name: repr.name,
        zero: repr.zero,
        precision: precision.precision,
        scale: precision.scale,
    }
}

/// Pick the representation for `mode`.
///
/// Families without a driver wrapper treat `Full` as `Standard` and `Hybrid`
/// as `Pointer`.
fn present(mode: TypeMode, native: &NativeType, nullable: bool) -> Repr {
    match (mode, native.wrapper) {
        (TypeMode::Standard, _) | (TypeMode::Full, None) => optional(&native.standard, nullable),
        (TypeMode::Full, Some(wrapper)) => wrapper_repr(wrapper),
        (TypeMode::Hybrid, Some(wrapper)) if nullable => wrapper_repr(wrapper),
        (TypeMode::Pointer | TypeMode::Hybrid, _) => {
            if nullable {
                Repr::new(format!("Option<Box<{}>>", native.internal.name), "None")
            } else {
                native.internal.clone()
            }
        }
    }
}

fn optional(repr: &Repr, nullable: bool) -> Repr {
    if nullable {
        Repr::new(format!("Option<{}>", repr.name), "None")
    } else {
        repr.clone()
    }
}

fn wrapper_repr(wrapper: &str) -> Repr {
    Repr::new(wrapper, format!("{wrapper}::default()"))
}

/// Unknown types are assumed to be user-defined (enums, composites).
fn fallback(ctx: &TypeContext<'_>, descriptor: &str, nullable: bool) -> Repr {
    let local = match descriptor.split_once('.') {
        Some((schema, name)) if schema == ctx.schema => name,
        _ => descriptor,
    };
    let name = ctx.names.to_camel(local);
    let zero = format!("{name}::default()");
    optional(&Repr::new(name, zero), nullable)
}

/// Remove the first `(p)` / `(p, s)` group from `descriptor`.
///
/// `numeric(10, 2)` → (`numeric`, 10, 2); `timestamp(3) with time zone` →
/// (`timestamp with time zone`, 3). Groups that are not numeric are left alone.
pub fn parse_precision(descriptor: &str) -> (String, Precision) {
    let Some(open) = descriptor.find('(') else {
        return (descriptor.to_string(), Precision::default());
    };
    let Some(close) = descriptor[open..].find(')').map(|i| open + i) else {
        return (descriptor.to_string(), Precision::default());
    };

    let inner = &descriptor[open + 1..close];
    let mut parts = inner.split(',').map(str::trim);
    let precision = parts.next().and_then(|p| p.parse::<u32>().ok());
    let scale = match parts.next() {
        Some(s) => match s.parse::<u32>() {
            Ok(s) => Some(s),
            Err(_) => return (descriptor.to_string(), Precision::default()),
        },
        None => None,
    };
    if precision.is_none() || parts.next().is_some() {
        return (descriptor.to_string(), Precision::default());
    }

    let head = descriptor[..open].trim_end();
    let tail = descriptor[close + 1..].trim_start();
    let stripped = if tail.is_empty() {
        head.to_string()
    } else {
        format!("{head} {tail}")
    };
    (stripped, Precision { precision, scale })
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(dt: &str, _: Precision, ctx: &TypeContext<'_>) -> Option<NativeType> {
        match dt {
            "int" => Some(NativeType::plain(ctx.int32_type, "0")),
            "text" => Some(NativeType::plain("String", "String::new()").wrapped("drv::Text")),
            "bool" => Some(
                NativeType::plain("bool", "false")
                    .internal("u8", "0")
                    .wrapped("drv::Bool"),
            ),
            _ => None,
        }
    }

    fn resolve(mode: TypeMode, native: &str, nullable: bool) -> ResolvedType {
        let names = Initialisms::default();
        let ctx = TypeContext {
            schema: "public",
            mode,
            int32_type: "i32",
            uint32_type: "u32",
            names: &names,
        };
        resolve_native(&ctx, native, nullable, &lookup)
    }

    #[test]
    fn precision_is_extracted() {
        assert_eq!(
            parse_precision("numeric(10, 2)"),
            (
                "numeric".to_string(),
                Precision {
                    precision: Some(10),
                    scale: Some(2)
                }
            )
        );
        let (dt, p) = parse_precision("timestamp(3) with time zone");
        assert_eq!(dt, "timestamp with time zone");
        assert_eq!(p.precision, Some(3));
        assert_eq!(p.scale, None);

        let (dt, p) = parse_precision("enum('a','b')");
        assert_eq!(dt, "enum('a','b')");
        assert_eq!(p, Precision::default());
    }

    #[test]
    fn modes_select_families() {
        assert_eq!(resolve(TypeMode::Standard, "bool", false).name, "bool");
        assert_eq!(resolve(TypeMode::Standard, "bool", true).name, "Option<bool>");
        assert_eq!(resolve(TypeMode::Pointer, "bool", false).name, "u8");
        assert_eq!(resolve(TypeMode::Pointer, "bool", true).name, "Option<Box<u8>>");
        assert_eq!(resolve(TypeMode::Hybrid, "bool", false).name, "u8");
        assert_eq!(resolve(TypeMode::Hybrid, "bool", true).name, "drv::Bool");
        assert_eq!(resolve(TypeMode::Full, "bool", false).name, "drv::Bool");
        assert_eq!(resolve(TypeMode::Full, "bool", false).zero, "drv::Bool::default()");
        // no wrapper: Full behaves like Standard
        assert_eq!(resolve(TypeMode::Full, "int", true).name, "Option<i32>");
    }

    #[test]
    fn arrays_and_setof() {
        let list = resolve(TypeMode::Standard, "text[]", true);
        assert_eq!(list.name, STRING_LIST);
        assert_eq!(list.zero, "StringList::default()");

        let ints = resolve(TypeMode::Standard, "int[]", true);
        assert_eq!(ints.name, "Vec<i32>");
        assert_eq!(ints.zero, "Vec::new()");

        let set = resolve(TypeMode::Standard, "SETOF int", true);
        assert_eq!(set.name, "Vec<i32>");
        assert_eq!(set.zero, "Vec::new()");
    }

    #[test]
    fn unknown_types_fall_back_to_local_names() {
        let local = resolve(TypeMode::Standard, "public.mood_kind", false);
        assert_eq!(local.name, "MoodKind");
        assert_eq!(local.zero, "MoodKind::default()");

        let foreign = resolve(TypeMode::Standard, "audit.mood_kind", true);
        assert_eq!(foreign.name, "Option<AuditMoodKind>");

        assert_eq!(resolve(TypeMode::Standard, "mood[]", false).name, "Vec<Mood>");
    }

    #[test]
    fn resolution_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                resolve(TypeMode::Hybrid, "bool", true),
                resolve(TypeMode::Hybrid, "bool", true)
            );
        }
    }
}
