//! Binding between an anonymous browser session and its cart.

use std::cell::OnceCell;

use actix_session::Session;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::repository::{CartReader, CartWriter};
use crate::services::{ServiceError, ServiceResult};

/// Session entry holding the random key the cart is bound to.
pub const SESSION_KEY_ENTRY: &str = "cart_session_key";
/// Session entry holding the id of the resolved cart.
pub const CART_ID_ENTRY: &str = "cart_id";

/// Minimal view of the per-request session used by the binding.
pub trait SessionState {
    fn session_key(&self) -> ServiceResult<Option<String>>;
    fn set_session_key(&self, session_key: &str) -> ServiceResult<()>;
    fn set_cart_id(&self, cart_id: i32) -> ServiceResult<()>;
}

impl SessionState for Session {
    fn session_key(&self) -> ServiceResult<Option<String>> {
        self.get::<String>(SESSION_KEY_ENTRY)
            .map_err(|err| ServiceError::Session(err.to_string()))
    }

    fn set_session_key(&self, session_key: &str) -> ServiceResult<()> {
        self.insert(SESSION_KEY_ENTRY, session_key)
            .map_err(|err| ServiceError::Session(err.to_string()))
    }

    fn set_cart_id(&self, cart_id: i32) -> ServiceResult<()> {
        self.insert(CART_ID_ENTRY, cart_id)
            .map_err(|err| ServiceError::Session(err.to_string()))
    }
}

/// Per-request cart resolver.
///
/// The first call to [`CartBinding::cart`] resolves (or creates) the session
/// key and the cart row, records the cart id in the session and memoizes the
/// cart. Later calls within the same request return the memoized value.
pub struct CartBinding<'a, S: SessionState + ?Sized> {
    session: &'a S,
    cart: OnceCell<Cart>,
}

impl<'a, S: SessionState + ?Sized> CartBinding<'a, S> {
    pub fn new(session: &'a S) -> Self {
        Self {
            session,
            cart: OnceCell::new(),
        }
    }

    /// Resolve the cart bound to the session, creating it on first use.
    pub fn cart<R>(&self, repo: &R) -> ServiceResult<&Cart>
    where
        R: CartReader + CartWriter + ?Sized,
    {
        if let Some(cart) = self.cart.get() {
            return Ok(cart);
        }

        let session_key = match self.session.session_key()? {
            Some(key) if !key.is_empty() => key,
            _ => {
                let key = new_session_key();
                self.session.set_session_key(&key)?;
                key
            }
        };

        let cart = match repo.get_cart_by_session_key(&session_key)? {
            Some(cart) => cart,
            None => {
                let cart = repo.create_cart(&session_key)?;
                log::debug!("Created cart {} for a new session", cart.id);
                cart
            }
        };

        self.session.set_cart_id(cart.id)?;

        Ok(self.cart.get_or_init(|| cart))
    }
}

fn new_session_key() -> String {
    Uuid::new_v4().simple().to_string()
}
