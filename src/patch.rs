use serde::{Deserialize, Deserializer};

/// A field of a partial update payload.
///
/// `Absent` means the key was not sent and the stored value must be kept.
/// `Set(v)` replaces the stored value. Nullable columns use `Patch<Option<T>>`,
/// so a JSON `null` becomes `Set(None)` and clears the column.
///
/// Fields must be annotated with `#[serde(default)]` so a missing key
/// deserializes to `Absent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Absent => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Set(value) => Patch::Set(f(value)),
            Patch::Absent => Patch::Absent,
        }
    }

    /// Overwrites `target` when the field was supplied
    pub fn apply_to(self, target: &mut T) {
        if let Patch::Set(value) = self {
            *target = value;
        }
    }

    /// The value after applying this patch on top of `current`
    pub fn merged<'a>(&'a self, current: &'a T) -> &'a T {
        self.as_set().unwrap_or(current)
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Patch::Set(value),
            None => Patch::Absent,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Patch::Set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        description: Patch<Option<String>>,
    }

    #[test]
    fn test_missing_key_is_absent() {
        let payload: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.name, Patch::Absent);
        assert_eq!(payload.description, Patch::Absent);
    }

    #[test]
    fn test_null_clears_nullable_field() {
        let payload: Payload = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(payload.description, Patch::Set(None));
        assert_eq!(payload.name, Patch::Absent);
    }

    #[test]
    fn test_value_is_set() {
        let payload: Payload =
            serde_json::from_str(r#"{"name": "novo", "description": "texto"}"#).unwrap();
        assert_eq!(payload.name, Patch::Set("novo".to_string()));
        assert_eq!(payload.description, Patch::Set(Some("texto".to_string())));
    }

    #[test]
    fn test_null_rejected_for_required_field() {
        let result: Result<Payload, _> = serde_json::from_str(r#"{"name": null}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_to_only_touches_set_fields() {
        let mut name = "antigo".to_string();
        Patch::Absent.apply_to(&mut name);
        assert_eq!(name, "antigo");

        Patch::Set("novo".to_string()).apply_to(&mut name);
        assert_eq!(name, "novo");
    }

    #[test]
    fn test_merged() {
        let current = 5;
        assert_eq!(*Patch::Absent.merged(&current), 5);
        assert_eq!(*Patch::Set(7).merged(&current), 7);
    }
}
