#![forbid(unsafe_code)]

//! The normalized option shape.

use std::fmt;

/// Optional display fields carried by an option's extras.
///
/// Every method defaults to `None`, so an extras type implements only what it
/// has. `kind` is the record's "type" column (party type, carrier type).
pub trait OptionFields {
    fn code(&self) -> Option<&str> {
        None
    }

    fn email(&self) -> Option<&str> {
        None
    }

    fn kind(&self) -> Option<&str> {
        None
    }

    /// Any other named display field.
    fn field(&self, _key: &str) -> Option<&str> {
        None
    }
}

impl OptionFields for () {}

/// One selectable entry: opaque `id`, human-readable `name`, typed extras.
///
/// Options are snapshots; widgets only read them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectOption<E = ()> {
    pub id: String,
    pub name: String,
    pub extra: E,
}

impl SelectOption<()> {
    /// Option with no extras.
    pub fn plain(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, ())
    }
}

impl<E> SelectOption<E> {
    pub fn new(id: impl Into<String>, name: impl Into<String>, extra: E) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra,
        }
    }
}

impl<E: OptionFields> SelectOption<E> {
    /// Look up a display field by key.
    ///
    /// `id` and `name` come from the option itself; `code`, `email` and `type`
    /// from the extras; anything else goes to [`OptionFields::field`].
    pub fn field(&self, key: &str) -> Option<&str> {
        match key {
            "id" => Some(&self.id),
            "name" => Some(&self.name),
            "code" => self.extra.code(),
            "email" => self.extra.email(),
            "type" => self.extra.kind(),
            other => self.extra.field(other),
        }
    }

    #[inline]
    pub fn code(&self) -> Option<&str> {
        self.extra.code()
    }

    #[inline]
    pub fn email(&self) -> Option<&str> {
        self.extra.email()
    }

    #[inline]
    pub fn kind(&self) -> Option<&str> {
        self.extra.kind()
    }
}

impl<E> fmt::Display for SelectOption<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Coded(&'static str);

    impl OptionFields for Coded {
        fn code(&self) -> Option<&str> {
            Some(self.0)
        }

        fn field(&self, key: &str) -> Option<&str> {
            (key == "country").then_some("SG")
        }
    }

    #[test]
    fn field_dispatch() {
        let opt = SelectOption::new("7", "Singapore", Coded("SGSIN"));
        assert_eq!(opt.field("id"), Some("7"));
        assert_eq!(opt.field("name"), Some("Singapore"));
        assert_eq!(opt.field("code"), Some("SGSIN"));
        assert_eq!(opt.field("country"), Some("SG"));
        assert_eq!(opt.field("email"), None);
        assert_eq!(opt.field("type"), None);
    }

    #[test]
    fn plain_option_has_no_extras() {
        let opt = SelectOption::plain("airways", "Airways");
        assert_eq!(opt.code(), None);
        assert_eq!(opt.to_string(), "Airways");
    }
}
