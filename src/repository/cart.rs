use chrono::Local;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel::upsert::excluded;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::cart::{
    Cart as DomainCart, CartItem as DomainCartItem, CartLine as DomainCartLine, CartTotals,
};
use crate::domain::product::Product as DomainProduct;
use crate::models::cart::{
    Cart as DbCart, CartItem as DbCartItem, NewCart as DbNewCart, NewCartItem as DbNewCartItem,
};
use crate::models::product::Product as DbProduct;
use crate::repository::{CartReader, CartWriter, DieselRepository};

impl CartReader for DieselRepository {
    fn get_cart_by_session_key(&self, session_key: &str) -> RepositoryResult<Option<DomainCart>> {
        let mut conn = self.conn()?;

        let cart = find_cart(&mut conn, session_key)?;

        Ok(cart.map(DomainCart::from))
    }

    fn list_cart_lines(&self, cart_id: i32) -> RepositoryResult<Vec<DomainCartLine>> {
        use crate::schema::{cart_items, products};

        let mut conn = self.conn()?;

        let rows = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::cart_id.eq(cart_id))
            .order((cart_items::added_at.desc(), cart_items::id.desc()))
            .select((DbCartItem::as_select(), DbProduct::as_select()))
            .load::<(DbCartItem, DbProduct)>(&mut conn)?;

        let lines = rows
            .into_iter()
            .map(|(item, product)| DomainCartLine {
                item: DomainCartItem::from(item),
                product: DomainProduct::from(product),
            })
            .collect();

        Ok(lines)
    }

    fn cart_totals(&self, cart_id: i32) -> RepositoryResult<CartTotals> {
        use crate::schema::{cart_items, products};

        let mut conn = self.conn()?;

        let rows = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::cart_id.eq(cart_id))
            .select((cart_items::quantity, products::price_cents))
            .load::<(i32, i64)>(&mut conn)?;

        let totals = rows.into_iter().fold(
            CartTotals::default(),
            |acc, (quantity, price_cents)| CartTotals {
                total_items: acc.total_items + i64::from(quantity),
                subtotal_cents: acc.subtotal_cents + i64::from(quantity) * price_cents,
            },
        );

        Ok(totals)
    }
}

impl CartWriter for DieselRepository {
    fn create_cart(&self, session_key: &str) -> RepositoryResult<DomainCart> {
        use crate::schema::carts;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainCart, RepositoryError, _>(|conn| {
            let now = Local::now().naive_utc();
            let insertable = DbNewCart {
                session_key,
                created_at: now,
                updated_at: now,
            };

            // A concurrent first visit may have inserted the row already.
            diesel::insert_into(carts::table)
                .values(&insertable)
                .on_conflict(carts::session_key)
                .do_nothing()
                .execute(conn)?;

            match find_cart(conn, session_key)? {
                Some(cart) => Ok(cart.into()),
                None => Err(RepositoryError::NotFound),
            }
        })
    }

    fn add_product_to_cart(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i32,
    ) -> RepositoryResult<DomainCartItem> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainCartItem, RepositoryError, _>(|conn| {
            let insertable = DbNewCartItem {
                cart_id,
                product_id,
                quantity,
                added_at: Local::now().naive_utc(),
            };

            let item = diesel::insert_into(cart_items::table)
                .values(&insertable)
                .on_conflict((cart_items::cart_id, cart_items::product_id))
                .do_update()
                .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)))
                .get_result::<DbCartItem>(conn)?;

            touch_cart(conn, cart_id)?;

            Ok(item.into())
        })
    }

    fn set_cart_item_quantity(
        &self,
        cart_id: i32,
        item_id: i32,
        quantity: i32,
    ) -> RepositoryResult<Option<DomainCartItem>> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<Option<DomainCartItem>, RepositoryError, _>(|conn| {
            let existing = cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::cart_id.eq(cart_id))
                .first::<DbCartItem>(conn)
                .optional()?;

            let Some(existing) = existing else {
                return Err(RepositoryError::NotFound);
            };

            let target = cart_items::table.filter(cart_items::id.eq(existing.id));

            let updated = if quantity == 0 {
                diesel::delete(target).execute(conn)?;
                None
            } else {
                let item = diesel::update(target)
                    .set(cart_items::quantity.eq(quantity))
                    .get_result::<DbCartItem>(conn)?;
                Some(item.into())
            };

            touch_cart(conn, cart_id)?;

            Ok(updated)
        })
    }

    fn remove_cart_item(&self, cart_id: i32, item_id: i32) -> RepositoryResult<()> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<(), RepositoryError, _>(|conn| {
            let deleted = diesel::delete(
                cart_items::table
                    .filter(cart_items::id.eq(item_id))
                    .filter(cart_items::cart_id.eq(cart_id)),
            )
            .execute(conn)?;

            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            touch_cart(conn, cart_id)?;

            Ok(())
        })
    }

    fn clear_cart(&self, cart_id: i32) -> RepositoryResult<usize> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<usize, RepositoryError, _>(|conn| {
            let deleted = diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id)))
                .execute(conn)?;

            touch_cart(conn, cart_id)?;

            Ok(deleted)
        })
    }
}

fn find_cart(conn: &mut SqliteConnection, session_key: &str) -> RepositoryResult<Option<DbCart>> {
    use crate::schema::carts;

    let cart = carts::table
        .filter(carts::session_key.eq(session_key))
        .first::<DbCart>(conn)
        .optional()?;

    Ok(cart)
}

fn touch_cart(conn: &mut SqliteConnection, cart_id: i32) -> RepositoryResult<()> {
    use crate::schema::carts;

    diesel::update(carts::table.filter(carts::id.eq(cart_id)))
        .set(carts::updated_at.eq(Local::now().naive_utc()))
        .execute(conn)?;

    Ok(())
}
