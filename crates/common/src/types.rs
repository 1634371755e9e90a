use serde::{Deserialize, Serialize};

/// Unique identifier for a customer.
///
/// Wraps the numeric id assigned by the backing store so customer ids
/// cannot be mixed up with product or order ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CustomerId(i64);

impl CustomerId {
    /// Creates a customer ID from a raw numeric id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CustomerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<CustomerId> for i64 {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

/// Unique identifier for a catalog product.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Creates a product ID from a raw numeric id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// Unique identifier for a placed order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Creates an order ID from a raw numeric id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for i64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_id_preserves_value() {
        let id = CustomerId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
    }

    #[test]
    fn ids_of_same_value_are_equal() {
        assert_eq!(ProductId::new(7), ProductId::from(7));
        assert_ne!(OrderId::new(1), OrderId::new(2));
    }

    #[test]
    fn ids_display_as_plain_numbers() {
        assert_eq!(CustomerId::new(3).to_string(), "3");
        assert_eq!(ProductId::new(11).to_string(), "11");
        assert_eq!(OrderId::new(99).to_string(), "99");
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&CustomerId::new(5)).unwrap();
        assert_eq!(json, "5");
        let back: CustomerId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CustomerId::new(5));
    }

    #[test]
    fn ids_order_by_value() {
        let mut ids = vec![OrderId::new(3), OrderId::new(1), OrderId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![OrderId::new(1), OrderId::new(2), OrderId::new(3)]);
    }
}
