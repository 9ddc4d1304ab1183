//! Deterministic synthetic data generator.
//!
//! The [`Seeder`] fills a store with a fixed category tree, users, products
//! and orders. Every stage tops the store up to a target count: running it
//! again with the same targets creates nothing, and raising a target creates
//! only the difference.
//!
//! All randomness comes from one `u64` seed, so two runs against empty
//! stores with the same seed produce the same rows.
//!
//! # Example
//!
//! ```ignore
//! use shop_diagnostics::seed::{SeedPlan, Seeder};
//!
//! let mut seeder = Seeder::new(storage, 42);
//! let report = seeder.run(&SeedPlan::default()).await?;
//! println!("{} orders created", report.orders_created);
//! ```

mod taxonomy;

pub use taxonomy::{category_count, SUBCATEGORIES, TOP_LEVEL};

use fake::faker::company::en::CatchPhrase;
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::lorem::en::Paragraphs;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SeedError;
use crate::storage::{Category, NewProduct, NewUser, OrderStatus, Product, ShopStorage, User};

/// Username of the superuser every seeded store has.
pub const ADMIN_USERNAME: &str = "admin";

/// Placeholder password for generated users.
pub const DEFAULT_PASSWORD: &str = "testpass123";

/// Attempts at finding a free username before giving up.
pub const MAX_USERNAME_ATTEMPTS: u32 = 10;

const PRICE_CENTS_MIN: i64 = 999;
const PRICE_CENTS_MAX: i64 = 99_999;
const MAX_ITEMS_PER_ORDER: usize = 8;
const MAX_QUANTITY: u32 = 5;

/// Target row counts for a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPlan {
    /// Users to have, admin included.
    pub users: u64,
    /// Products to have.
    pub products: u64,
    /// Orders to have.
    pub orders: u64,
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self {
            users: 100,
            products: 1000,
            orders: 500,
        }
    }
}

/// Rows created by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    /// Categories created.
    pub categories_created: usize,
    /// Users created, admin included.
    pub users_created: usize,
    /// Products created.
    pub products_created: usize,
    /// Orders created.
    pub orders_created: usize,
}

/// Result of one seeding stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seeded<T> {
    /// Every row of the kind in the store after the stage.
    pub all: Vec<T>,
    /// How many of them the stage created.
    pub created: usize,
}

/// Seeds a store from a fixed random seed.
#[derive(Debug)]
pub struct Seeder {
    storage: ShopStorage,
    rng: StdRng,
}

impl Seeder {
    /// Create a seeder writing to `storage`.
    #[must_use]
    pub fn new(storage: ShopStorage, seed: u64) -> Self {
        Self {
            storage,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Run every stage in order.
    ///
    /// Stages are not rolled back if a later one fails; each can be re-run.
    ///
    /// # Errors
    ///
    /// Returns the first [`SeedError`] any stage hits.
    pub async fn run(&mut self, plan: &SeedPlan) -> Result<SeedReport, SeedError> {
        info!("Creating categories...");
        let categories = self.seed_categories().await?;

        info!(target = plan.users, "Creating users...");
        let users = self.seed_users(plan.users).await?;

        info!(target = plan.products, "Creating products...");
        let products = self
            .seed_products(&categories.all, &users.all, plan.products)
            .await?;

        info!(target = plan.orders, "Creating orders...");
        let orders_created = self
            .seed_orders(&users.all, &products.all, plan.orders)
            .await?;

        let report = SeedReport {
            categories_created: categories.created,
            users_created: users.created,
            products_created: products.created,
            orders_created,
        };
        info!(
            categories = report.categories_created,
            users = report.users_created,
            products = report.products_created,
            orders = report.orders_created,
            "Seeding complete"
        );
        Ok(report)
    }

    /// Make sure the fixed category tree exists.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Storage`] if a lookup or insert fails.
    pub async fn seed_categories(&mut self) -> Result<Seeded<Category>, SeedError> {
        let mut all = Vec::with_capacity(category_count());
        let mut created = 0;

        for name in TOP_LEVEL {
            let (category, is_new) = self.storage.get_or_create_category(name, None).await?;
            created += usize::from(is_new);
            all.push(category);
        }

        for (parent_name, subs) in SUBCATEGORIES {
            let Some(parent_id) = all
                .iter()
                .find(|c| c.parent_id.is_none() && c.name == parent_name)
                .map(|c| c.id)
            else {
                continue;
            };

            for name in subs {
                let (category, is_new) = self
                    .storage
                    .get_or_create_category(name, Some(parent_id))
                    .await?;
                created += usize::from(is_new);
                all.push(category);
            }
        }

        debug!(total = all.len(), created, "Categories seeded");
        Ok(Seeded { all, created })
    }

    /// Make sure the admin exists, then top users up to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::UsernameExhausted`] if no free username turns up
    /// within [`MAX_USERNAME_ATTEMPTS`], or [`SeedError::Storage`].
    pub async fn seed_users(&mut self, target: u64) -> Result<Seeded<User>, SeedError> {
        let mut created = 0;

        if self
            .storage
            .find_user_by_username(ADMIN_USERNAME)
            .await?
            .is_none()
        {
            let admin = NewUser::superuser(ADMIN_USERNAME, "admin@example.com", "admin");
            if self.storage.create_user(&admin).await?.is_some() {
                created += 1;
            }
        }

        let existing = self.storage.count_users().await?;
        let to_create = target.saturating_sub(existing);

        for _ in 0..to_create {
            self.create_generated_user().await?;
            created += 1;
        }

        let all = self.storage.list_users().await?;
        debug!(total = all.len(), created, "Users seeded");
        Ok(Seeded { all, created })
    }

    async fn create_generated_user(&mut self) -> Result<User, SeedError> {
        for attempt in 1..=MAX_USERNAME_ATTEMPTS {
            let base: String = Username().fake_with_rng(&mut self.rng);
            let suffix: u16 = self.rng.gen_range(1000..=9999);
            let email: String = SafeEmail().fake_with_rng(&mut self.rng);
            let username = format!("{base}{suffix}");

            let new_user = NewUser::new(&username, email, DEFAULT_PASSWORD);
            if let Some(user) = self.storage.create_user(&new_user).await? {
                return Ok(user);
            }
            debug!(username, attempt, "Username taken, retrying");
        }

        Err(SeedError::UsernameExhausted {
            attempts: MAX_USERNAME_ATTEMPTS,
        })
    }

    /// Top products up to `target`.
    ///
    /// Each new product gets a random category from `categories` and a
    /// random owner from `users`.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::EmptyPool`] if products are needed but either
    /// pool is empty, or [`SeedError::Storage`].
    pub async fn seed_products(
        &mut self,
        categories: &[Category],
        users: &[User],
        target: u64,
    ) -> Result<Seeded<Product>, SeedError> {
        let existing = self.storage.count_products().await?;
        let to_create = target.saturating_sub(existing);
        let mut created = 0;

        if to_create > 0 {
            if categories.is_empty() {
                return Err(SeedError::EmptyPool {
                    stage: "products",
                    entity: "categories",
                });
            }
            if users.is_empty() {
                return Err(SeedError::EmptyPool {
                    stage: "products",
                    entity: "users",
                });
            }
        }

        for _ in 0..to_create {
            let name: String = CatchPhrase().fake_with_rng(&mut self.rng);
            let paragraphs: Vec<String> = Paragraphs(5..6).fake_with_rng(&mut self.rng);
            let price = Decimal::new(self.rng.gen_range(PRICE_CENTS_MIN..=PRICE_CENTS_MAX), 2);
            let (Some(category), Some(owner)) = (
                categories.choose(&mut self.rng),
                users.choose(&mut self.rng),
            ) else {
                break;
            };

            self.storage
                .create_product(&NewProduct::new(
                    name,
                    paragraphs.join("\n"),
                    price,
                    category.id,
                    owner.id,
                ))
                .await?;
            created += 1;
        }

        let all = self.storage.list_products().await?;
        debug!(total = all.len(), created, "Products seeded");
        Ok(Seeded { all, created })
    }

    /// Top orders up to `target`, returning how many were created.
    ///
    /// Each order holds one to eight distinct products, fewer if the pool is
    /// smaller. Item prices are the products' current prices.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::EmptyPool`] if orders are needed but either pool
    /// is empty, or [`SeedError::Storage`].
    pub async fn seed_orders(
        &mut self,
        users: &[User],
        products: &[Product],
        target: u64,
    ) -> Result<usize, SeedError> {
        let existing = self.storage.count_orders().await?;
        let to_create = target.saturating_sub(existing);
        let mut created = 0;

        if to_create > 0 {
            if users.is_empty() {
                return Err(SeedError::EmptyPool {
                    stage: "orders",
                    entity: "users",
                });
            }
            if products.is_empty() {
                return Err(SeedError::EmptyPool {
                    stage: "orders",
                    entity: "products",
                });
            }
        }

        for _ in 0..to_create {
            let Some(owner) = users.choose(&mut self.rng) else {
                break;
            };
            let status = OrderStatus::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or_default();
            let order = self.storage.create_order(owner.id, status).await?;

            let wanted = self.rng.gen_range(1..=MAX_ITEMS_PER_ORDER);
            for product in sample_items(&mut self.rng, products, wanted) {
                let quantity = self.rng.gen_range(1..=MAX_QUANTITY);
                self.storage
                    .add_order_item(order.id, product.id, quantity, product.price)
                    .await?;
            }
            created += 1;
        }

        debug!(created, "Orders seeded");
        Ok(created)
    }
}

/// Up to `wanted` distinct products, fewer if the pool is smaller.
fn sample_items<'a, R: Rng + ?Sized>(
    rng: &mut R,
    products: &'a [Product],
    wanted: usize,
) -> Vec<&'a Product> {
    products
        .choose_multiple(rng, wanted.min(products.len()))
        .collect()
}
