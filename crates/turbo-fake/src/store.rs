//! Mutable backend state: carts.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use turbo_commerce::{Cart, CartId};

/// In-memory cart storage shared by the cart procedures.
#[derive(Debug, Default)]
pub struct CartStore {
    carts: Mutex<HashMap<CartId, Cart>>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &CartId) -> Option<Cart> {
        self.lock().get(id).cloned()
    }

    /// Apply `update` to the cart `id`, creating it with `create` if absent.
    ///
    /// The cart is only stored if `update` succeeds.
    pub fn upsert<E>(
        &self,
        id: &CartId,
        create: impl FnOnce() -> Cart,
        update: impl FnOnce(&mut Cart) -> Result<(), E>,
    ) -> Result<Cart, E> {
        let mut carts = self.lock();
        let mut cart = carts.get(id).cloned().unwrap_or_else(create);
        update(&mut cart)?;
        carts.insert(id.clone(), cart.clone());
        Ok(cart)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CartId, Cart>> {
        self.carts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbo_commerce::{CommerceError, Currency, Money};

    #[test]
    fn test_upsert_creates_then_updates() {
        let store = CartStore::new();
        let id = CartId::new("c-1");
        let create = || Cart::new(CartId::new("c-1"), Currency::USD);

        store
            .upsert(&id, create, |cart| {
                cart.add_item("S", "p".into(), "A", 1, Money::new(100, Currency::USD)).map(|_| ())
            })
            .unwrap();
        let cart = store
            .upsert(&id, create, |cart| {
                cart.add_item("S", "p".into(), "A", 2, Money::new(100, Currency::USD)).map(|_| ())
            })
            .unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(store.get(&id), Some(cart));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_update_is_not_stored() {
        let store = CartStore::new();
        let id = CartId::new("c-1");

        let result: Result<Cart, CommerceError> = store.upsert(
            &id,
            || Cart::new(id.clone(), Currency::USD),
            |cart| cart.add_item("S", "p".into(), "A", 0, Money::new(100, Currency::USD)).map(|_| ()),
        );

        assert!(result.is_err());
        assert!(store.is_empty());
    }
}
