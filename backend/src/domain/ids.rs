//! Strongly typed entity identifiers.
//!
//! Every entity is keyed by a UUID v4. Wrapping each in its own newtype stops
//! a quiz id from being passed where a material id is expected.

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(value: ::uuid::Uuid) -> Self {
                Self(value)
            }
        }
    };
}

define_id!(
    /// Identifier of a registered user.
    UserId
);
define_id!(
    /// Identifier of an uploaded or linked study material.
    MaterialId
);
define_id!(
    /// Identifier of a tutoring conversation.
    ConversationId
);
define_id!(
    /// Identifier of a single conversation message.
    MessageId
);
define_id!(
    /// Identifier of a mind map.
    MindMapId
);
define_id!(
    /// Identifier of a generated quiz.
    QuizId
);
define_id!(
    /// Identifier of a submitted quiz attempt.
    AttemptId
);

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn parses_and_displays_uuid_text() {
        let raw = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let id: MaterialId = raw.parse().expect("valid uuid");
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn rejects_non_uuid_text() {
        assert!("not-a-uuid".parse::<QuizId>().is_err());
    }

    #[test]
    fn serialises_as_plain_string() {
        let id = UserId::from_uuid(Uuid::nil());
        let value = serde_json::to_value(id).expect("serialise id");
        assert_eq!(value, serde_json::json!(Uuid::nil().to_string()));
    }
}
