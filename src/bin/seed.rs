use std::str::FromStr;

use axum_bookstore_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Categories, ProductCategories, Products, Users,
        categories::{ActiveModel as CategoryActive, Column as CategoryCol},
        enums::{EntityState, Role},
        product_categories::ActiveModel as ProductCategoryActive,
        products::{ActiveModel as ProductActive, Column as ProdCol},
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    services::auth_service::{ensure_admin_account, hash_password},
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    ensure_admin_account(&orm, &config).await?;
    let user_id = ensure_user(&orm, "user@example.com", "User1234", "Demo User").await?;
    seed_catalog(&orm).await?;

    println!("Seed completed. Admin: {}, demo user ID: {user_id}", config.admin_email);
    orm.close().await?;
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    name: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)?),
        name: Set(name.to_string()),
        role: Set(Role::User),
        is_active: Set(true),
        state: Set(EntityState::Active),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(user.id)
}

async fn ensure_category(orm: &DatabaseConnection, name: &str, description: &str) -> anyhow::Result<Uuid> {
    if let Some(existing) = Categories::find()
        .filter(CategoryCol::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(Some(description.to_string())),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(category.id)
}

async fn seed_catalog(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let fiction = ensure_category(orm, "Fiction", "Novels and short stories").await?;
    let programming = ensure_category(orm, "Programming", "Books about writing software").await?;
    let science = ensure_category(orm, "Science", "Popular science").await?;

    let products = vec![
        ("The Rust Programming Language", "The official book on Rust", "39.99", vec![programming]),
        ("Zero To Production In Rust", "Backend development in Rust", "45.00", vec![programming]),
        ("Dune", "Science fiction classic", "12.50", vec![fiction]),
        ("A Brief History of Time", "From the Big Bang to black holes", "15.00", vec![science]),
        ("Project Hail Mary", "A lone astronaut saves the world", "18.90", vec![fiction, science]),
    ];

    for (title, description, price, category_ids) in products {
        let exists = Products::find()
            .filter(ProdCol::Title.eq(title))
            .one(orm)
            .await?;
        if exists.is_some() {
            continue;
        }

        let product = ProductActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.to_string()),
            price: Set(Decimal::from_str(price)?),
            description: Set(description.to_string()),
            image: Set(None),
            is_active: Set(true),
            state: Set(EntityState::Active),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;

        for category_id in category_ids {
            ProductCategories::insert(ProductCategoryActive {
                product_id: Set(product.id),
                category_id: Set(category_id),
            })
            .exec_without_returning(orm)
            .await?;
        }
    }

    println!("Seeded categories and products");
    Ok(())
}
