//! Deterministic synthetic dataset
//!
//! Populates an empty (or existing) database with customers, products,
//! campaigns, orders and order lines that follow realistic shapes: a
//! weighted customer base where some customers order far more often,
//! category-specific pricing, occasional discounts and a 70% completion
//! rate. The same seed and as-of date always produce the same rows.
//!
//! This is the only code path that writes to the database.

use crate::model::{
    Customer, CustomerAcquisition, MarketingCampaign, Order, OrderItem, OrderStatus, Product,
};
use crate::util::round2;
use anyhow::{bail, Context, Result};
use chrono::{Duration, NaiveDate};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Gamma;
use rusqlite::{params, Connection};

/// Orders are never dated before this, whatever the registration date
const EARLIEST_ORDER: (i32, u32, u32) = (2020, 1, 1);

/// Completed, Pending, Shipped, Cancelled, Returned
const STATUS_WEIGHTS: [u32; 5] = [70, 10, 10, 5, 5];
/// Lines per order: 1..=5
const LINES_PER_ORDER_WEIGHTS: [u32; 5] = [40, 30, 15, 10, 5];
/// Quantity per line: 1..=3
const QUANTITY_WEIGHTS: [u32; 3] = [70, 20, 10];

const STATES: [&str; 20] = [
    "CA", "NY", "TX", "FL", "IL", "PA", "OH", "MI", "GA", "NC", "NJ", "VA", "WA", "AZ", "MA",
    "TN", "IN", "MO", "MD", "WI",
];
const STATE_WEIGHTS: [u32; 20] = [12, 6, 9, 6, 4, 4, 4, 3, 3, 3, 3, 3, 2, 2, 2, 2, 2, 2, 2, 38];

const CITIES: [&str; 12] = [
    "Springfield", "Riverside", "Franklin", "Greenville", "Bristol", "Clinton", "Fairview",
    "Salem", "Madison", "Georgetown", "Arlington", "Ashland",
];
const FIRST_NAMES: [&str; 16] = [
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica",
];
const LAST_NAMES: [&str; 16] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas",
];
const GENDERS: [&str; 3] = ["Male", "Female", "Other"];
const GENDER_WEIGHTS: [u32; 3] = [48, 48, 4];

const CHANNELS: [&str; 7] = [
    "Google Ads", "Facebook", "Instagram", "Email", "YouTube", "TikTok", "Pinterest",
];
const PAYMENT_METHODS: [&str; 5] = ["Credit Card", "Debit Card", "PayPal", "Apple Pay", "Google Pay"];
const CAMPAIGN_WORDS: [&str; 10] = [
    "Spring", "Holiday", "Flash", "Loyalty", "Summer", "Back to School", "Clearance", "Launch",
    "Weekend", "VIP",
];
const PRODUCT_ADJECTIVES: [&str; 8] = [
    "Essential", "Premium", "Classic", "Ultra", "Compact", "Pro", "Everyday", "Signature",
];

/// (category, subcategories, brands, cost range)
struct CategorySpec {
    name: &'static str,
    subcategories: [&'static str; 5],
    brands: &'static [&'static str],
    cost: (f64, f64),
}

const CATEGORIES: [CategorySpec; 5] = [
    CategorySpec {
        name: "Electronics",
        subcategories: ["Smartphones", "Laptops", "Tablets", "Accessories", "Gaming"],
        brands: &["Apple", "Samsung", "Sony", "HP", "Dell", "Microsoft"],
        cost: (50.0, 800.0),
    },
    CategorySpec {
        name: "Clothing",
        subcategories: ["Mens", "Womens", "Kids", "Shoes", "Accessories"],
        brands: &["Nike", "Adidas", "Zara", "H&M", "Gap", "Levis"],
        cost: (10.0, 150.0),
    },
    CategorySpec {
        name: "Home",
        subcategories: ["Furniture", "Kitchen", "Decor", "Garden", "Storage"],
        brands: &["IKEA", "Target", "Home Depot", "Wayfair", "West Elm"],
        cost: (20.0, 300.0),
    },
    CategorySpec {
        name: "Sports",
        subcategories: ["Fitness", "Outdoor", "Team Sports", "Water Sports", "Winter"],
        brands: &["Nike", "Adidas", "Under Armour", "REI", "Patagonia"],
        cost: (15.0, 200.0),
    },
    CategorySpec {
        name: "Books",
        subcategories: ["Fiction", "Non-Fiction", "Educational", "Children", "Reference"],
        brands: &["Penguin", "Harper", "Random House", "Scholastic", "McGraw Hill"],
        cost: (8.0, 40.0),
    },
];

/// How much data to generate
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub rng_seed: u64,
    pub customers: usize,
    pub products: usize,
    pub campaigns: usize,
    pub orders: usize,
    /// Latest date any generated row may carry
    pub as_of: NaiveDate,
}

/// Rows written per table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: usize,
    pub products: usize,
    pub campaigns: usize,
    pub orders: usize,
    pub order_items: usize,
    pub acquisitions: usize,
}

/// In-memory dataset, generated before anything touches the database
struct Dataset {
    customers: Vec<Customer>,
    products: Vec<Product>,
    campaigns: Vec<MarketingCampaign>,
    orders: Vec<Order>,
    items: Vec<OrderItem>,
    acquisitions: Vec<CustomerAcquisition>,
}

/// Replace all data in `conn` with a freshly generated dataset.
///
/// Runs in one transaction: either every table is replaced or nothing is.
pub fn seed(conn: &mut Connection, options: &SeedOptions) -> Result<SeedSummary> {
    if options.orders > 0 && (options.customers == 0 || options.products == 0) {
        bail!("Cannot generate orders without at least one customer and one product");
    }

    let mut rng = StdRng::seed_from_u64(options.rng_seed);
    let dataset = generate(&mut rng, options)?;

    tracing::info!(
        "Generated {} customers, {} products, {} campaigns, {} orders ({} lines)",
        dataset.customers.len(),
        dataset.products.len(),
        dataset.campaigns.len(),
        dataset.orders.len(),
        dataset.items.len()
    );

    let tx = conn.transaction()?;
    clear(&tx)?;
    write(&tx, &dataset)?;
    tx.commit().context("Failed to commit seed transaction")?;

    Ok(SeedSummary {
        customers: dataset.customers.len(),
        products: dataset.products.len(),
        campaigns: dataset.campaigns.len(),
        orders: dataset.orders.len(),
        order_items: dataset.items.len(),
        acquisitions: dataset.acquisitions.len(),
    })
}

fn generate(rng: &mut StdRng, options: &SeedOptions) -> Result<Dataset> {
    let customers = generate_customers(rng, options.customers, options.as_of)?;
    let products = generate_products(rng, options.products);
    let campaigns = generate_campaigns(rng, options.campaigns, options.as_of);
    let (orders, items, acquisitions) =
        generate_orders(rng, &customers, &products, &campaigns, options)?;

    Ok(Dataset {
        customers,
        products,
        campaigns,
        orders,
        items,
        acquisitions,
    })
}

fn date_between(rng: &mut StdRng, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    if end <= start {
        return start;
    }
    start + Duration::days(rng.gen_range(0..=(end - start).num_days()))
}

fn weighted(weights: &[u32]) -> Result<WeightedIndex<u32>> {
    WeightedIndex::new(weights).context("Invalid weight table")
}

fn generate_customers(rng: &mut StdRng, n: usize, as_of: NaiveDate) -> Result<Vec<Customer>> {
    let states = weighted(&STATE_WEIGHTS)?;
    let genders = weighted(&GENDER_WEIGHTS)?;
    let registration_start = as_of - Duration::days(4 * 365);
    let lifetime_value = Gamma::new(2.0, 50.0).context("Invalid lifetime value distribution")?;

    let mut customers = Vec::with_capacity(n);
    for i in 0..n {
        let customer_id = i as i64 + 1;
        let first_name = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
        let last_name = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
        let age_days = rng.gen_range(18 * 365..=70 * 365);

        let clv: f64 = lifetime_value.sample(rng);

        customers.push(Customer {
            customer_id,
            email: format!(
                "{}.{}{}@example.com",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                customer_id
            ),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            registration_date: date_between(rng, registration_start, as_of),
            birth_date: as_of - Duration::days(age_days),
            gender: GENDERS[genders.sample(rng)],
            city: CITIES[rng.gen_range(0..CITIES.len())],
            state: STATES[states.sample(rng)],
            country: "USA",
            customer_lifetime_value: round2(clv),
        });
    }
    Ok(customers)
}

fn generate_products(rng: &mut StdRng, n: usize) -> Vec<Product> {
    let mut products = Vec::with_capacity(n);
    for i in 0..n {
        let category = &CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
        let subcategory = category.subcategories[rng.gen_range(0..category.subcategories.len())];
        let brand = category.brands[rng.gen_range(0..category.brands.len())];
        let adjective = PRODUCT_ADJECTIVES[rng.gen_range(0..PRODUCT_ADJECTIVES.len())];

        let cost_price = round2(rng.gen_range(category.cost.0..category.cost.1));
        let list_price = round2(cost_price * rng.gen_range(1.3..2.5));

        products.push(Product {
            product_id: i as i64 + 1,
            product_name: format!("{brand} {subcategory} {adjective}"),
            category: category.name,
            subcategory,
            brand,
            cost_price,
            list_price,
        });
    }
    products
}

fn generate_campaigns(rng: &mut StdRng, n: usize, as_of: NaiveDate) -> Vec<MarketingCampaign> {
    let earliest = earliest_order_date();
    let mut campaigns = Vec::with_capacity(n);
    for i in 0..n {
        let start_date = date_between(rng, earliest, as_of);
        let word = CAMPAIGN_WORDS[rng.gen_range(0..CAMPAIGN_WORDS.len())];
        let channel = CHANNELS[rng.gen_range(0..CHANNELS.len())];
        campaigns.push(MarketingCampaign {
            campaign_id: i as i64 + 1,
            campaign_name: format!("{word} {channel} Campaign {}", i + 1),
            start_date,
            end_date: start_date + Duration::days(rng.gen_range(7..90)),
            budget: round2(rng.gen_range(1000.0..50000.0)),
            channel,
        });
    }
    campaigns
}

fn earliest_order_date() -> NaiveDate {
    let (y, m, d) = EARLIEST_ORDER;
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

type Orders = (Vec<Order>, Vec<OrderItem>, Vec<CustomerAcquisition>);

fn generate_orders(
    rng: &mut StdRng,
    customers: &[Customer],
    products: &[Product],
    campaigns: &[MarketingCampaign],
    options: &SeedOptions,
) -> Result<Orders> {
    // Hidden value segment: 20% high (weight 3), 30% medium (2), 50% low (1)
    let segment = weighted(&[20, 30, 50])?;
    let customer_weights: Vec<u32> = customers
        .iter()
        .map(|_| match segment.sample(rng) {
            0 => 3,
            1 => 2,
            _ => 1,
        })
        .collect();

    let mut orders = Vec::with_capacity(options.orders);
    let mut items = Vec::new();
    let mut acquisitions = Vec::new();
    if options.orders == 0 {
        return Ok((orders, items, acquisitions));
    }

    let pick_customer = weighted(&customer_weights)?;
    let statuses = weighted(&STATUS_WEIGHTS)?;
    let lines_per_order = weighted(&LINES_PER_ORDER_WEIGHTS)?;
    let quantities = weighted(&QUANTITY_WEIGHTS)?;
    let earliest = earliest_order_date();

    for i in 0..options.orders {
        let order_id = i as i64 + 1;
        let customer = &customers[pick_customer.sample(rng)];

        let order_date = date_between(
            rng,
            customer.registration_date.max(earliest),
            options.as_of,
        );
        let ship_date = order_date + Duration::days(rng.gen_range(1..10));

        orders.push(Order {
            order_id,
            customer_id: customer.customer_id,
            order_date,
            ship_date: (rng.gen::<f64>() > 0.1).then_some(ship_date),
            status: OrderStatus::KNOWN[statuses.sample(rng)].clone(),
            shipping_cost: round2(rng.gen_range(0.0..25.0)),
            payment_method: PAYMENT_METHODS[rng.gen_range(0..PAYMENT_METHODS.len())],
        });

        let n_lines = (lines_per_order.sample(rng) + 1).min(products.len());
        for index in rand::seq::index::sample(rng, products.len(), n_lines) {
            let product = &products[index];
            let quantity = quantities.sample(rng) as i64 + 1;
            let unit_price = product.list_price;
            let discount_amount = if rng.gen::<f64>() > 0.7 {
                round2(unit_price * rng.gen_range(0.0..0.3))
            } else {
                0.0
            };
            items.push(OrderItem {
                order_id,
                product_id: product.product_id,
                quantity,
                unit_price,
                discount_amount,
            });
        }

        if !campaigns.is_empty() && rng.gen::<f64>() > 0.8 {
            let campaign = &campaigns[rng.gen_range(0..campaigns.len())];
            acquisitions.push(CustomerAcquisition {
                customer_id: customer.customer_id,
                campaign_id: campaign.campaign_id,
                acquisition_date: order_date,
                acquisition_cost: round2(rng.gen_range(5.0..100.0)),
            });
        }
    }

    Ok((orders, items, acquisitions))
}

/// Delete every row, children first so foreign keys hold throughout
fn clear(conn: &Connection) -> Result<()> {
    for table in super::schema::TABLES.iter().rev() {
        conn.execute(&format!("DELETE FROM {table}"), [])
            .with_context(|| format!("Failed to clear {table}"))?;
    }
    Ok(())
}

fn write(conn: &Connection, data: &Dataset) -> Result<()> {
    {
        let mut stmt = conn.prepare(
            "INSERT INTO customers (customer_id, email, first_name, last_name, registration_date,
                birth_date, gender, city, state, country, customer_lifetime_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for c in &data.customers {
            stmt.execute(params![
                c.customer_id,
                c.email,
                c.first_name,
                c.last_name,
                c.registration_date,
                c.birth_date,
                c.gender,
                c.city,
                c.state,
                c.country,
                c.customer_lifetime_value,
            ])?;
        }
    }

    {
        let mut stmt = conn.prepare(
            "INSERT INTO products (product_id, product_name, category, subcategory, brand,
                cost_price, list_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for p in &data.products {
            stmt.execute(params![
                p.product_id,
                p.product_name,
                p.category,
                p.subcategory,
                p.brand,
                p.cost_price,
                p.list_price,
            ])?;
        }
    }

    {
        let mut stmt = conn.prepare(
            "INSERT INTO marketing_campaigns (campaign_id, campaign_name, start_date, end_date,
                budget, channel)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for m in &data.campaigns {
            stmt.execute(params![
                m.campaign_id,
                m.campaign_name,
                m.start_date,
                m.end_date,
                m.budget,
                m.channel,
            ])?;
        }
    }

    {
        let mut stmt = conn.prepare(
            "INSERT INTO orders (order_id, customer_id, order_date, ship_date, order_status,
                shipping_cost, payment_method)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for o in &data.orders {
            stmt.execute(params![
                o.order_id,
                o.customer_id,
                o.order_date,
                o.ship_date,
                o.status.as_str(),
                o.shipping_cost,
                o.payment_method,
            ])?;
        }
    }

    {
        let mut stmt = conn.prepare(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price, discount_amount)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for item in &data.items {
            stmt.execute(params![
                item.order_id,
                item.product_id,
                item.quantity,
                item.unit_price,
                item.discount_amount,
            ])?;
        }
    }

    {
        let mut stmt = conn.prepare(
            "INSERT INTO customer_acquisition (customer_id, campaign_id, acquisition_date,
                acquisition_cost)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for a in &data.acquisitions {
            stmt.execute(params![
                a.customer_id,
                a.campaign_id,
                a.acquisition_date,
                a.acquisition_cost,
            ])?;
        }
    }

    Ok(())
}
