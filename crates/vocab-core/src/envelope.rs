use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Uniform result of every backend call.
///
/// Serializes as `{ "success": true, "data": ... }` or `{ "success": false, "error": "..." }`.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(T),
    Failure(String),
}

impl<T> Envelope<T> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Self::Success(data) => Envelope::Success(f(data)),
            Self::Failure(message) => Envelope::Failure(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        self.into()
    }
}

impl<T> From<Envelope<T>> for Result<T, String> {
    fn from(value: Envelope<T>) -> Self {
        match value {
            Envelope::Success(data) => Ok(data),
            Envelope::Failure(message) => Err(message),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Envelope<T> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(data) => Self::Success(data),
            Err(err) => Self::Failure(err.to_string()),
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Envelope", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(message) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", message)?;
            }
        }
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_with_data() {
        let envelope = Envelope::Success(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "success": true, "data": [1, 2] })
        );
    }

    #[test]
    fn failure_serializes_with_error() {
        let envelope: Envelope<()> = Envelope::failure("boom");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "success": false, "error": "boom" })
        );
        assert_eq!(envelope.error(), Some("boom"));
        assert!(envelope.data().is_none());
    }

    #[test]
    fn converts_to_and_from_result() {
        let ok: Envelope<u8> = Ok::<_, String>(3).into();
        assert_eq!(ok.clone().into_result(), Ok(3));
        assert_eq!(ok.map(|v| v * 2), Envelope::Success(6));
        let err: Envelope<u8> = Err::<u8, _>("bad").into();
        assert_eq!(err.into_result(), Err("bad".to_string()));
    }
}
