use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
///
/// Every identifier converts into an [`AggregateId`] so it can address the
/// stream of the aggregate it names.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Parses the hyphenated UUID form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Identifies one event stream (one aggregate instance).
    ///
    /// Streams are keyed by aggregate type *and* id, so the same UUID may
    /// address a buyer's cart and that buyer's address book.
    AggregateId
);

uuid_id!(
    /// A user as issued by the auth provider.
    UserId
);

uuid_id!(
    /// A seller. Sellers are users with a seller profile, so a seller id
    /// carries the same UUID as the owning user.
    SellerId
);

uuid_id!(
    /// A catalog product.
    ProductId
);

uuid_id!(
    /// A placed order.
    OrderId
);

uuid_id!(
    /// One delivery address in a buyer's address book.
    AddressId
);

impl SellerId {
    /// Returns the seller id belonging to a user.
    pub fn for_user(user_id: UserId) -> Self {
        Self(user_id.as_uuid())
    }

    /// Returns the user who owns this seller profile.
    pub fn user_id(&self) -> UserId {
        UserId(self.0)
    }
}

macro_rules! stream_of {
    ($($name:ident),*) => {
        $(
            impl From<$name> for AggregateId {
                fn from(id: $name) -> Self {
                    AggregateId(id.0)
                }
            }
        )*
    };
}

stream_of!(UserId, SellerId, ProductId, OrderId);

impl AggregateId {
    /// Deterministic stream id for a natural key, such as a SKU.
    ///
    /// The same `(scope, key)` pair always yields the same id, so a stream can
    /// act as a uniqueness claim on the key.
    pub fn for_key(scope: &str, key: &str) -> Self {
        let name = format!("{scope}:{key}");
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}
