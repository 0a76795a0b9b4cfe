use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    dto::products::ProductForm,
    entity::{
        Categories, ProductCategories, Products,
        categories::Column as CategoryCol,
        enums::EntityState,
        product_categories::{ActiveModel as ProductCategoryActive, Column as ProductCategoryCol},
        products::{ActiveModel, Column as ProdCol, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{
        filters::{live, product_condition},
        order_service::MAX_AMOUNT,
    },
    state::AppState,
    upload::store_file,
};

pub const PRODUCT_UPLOAD_FOLDER: &str = "products";

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
    include_inactive: bool,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let (page, limit, offset) = query.pagination().normalize();

    let sort_col = match query.sort_by.unwrap_or_default() {
        ProductSortBy::CreatedAt => ProdCol::CreatedAt,
        ProductSortBy::Price => ProdCol::Price,
        ProductSortBy::Title => ProdCol::Title,
    };

    let mut finder = Products::find().filter(product_condition(&query, include_inactive));
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder = finder.order_by_asc(ProdCol::Id);

    let total = finder.clone().count(&state.orm).await?;

    let models = finder
        .limit(limit)
        .offset(offset)
        .all(&state.orm)
        .await?;
    let items = attach_categories(&state.orm, models).await?;

    Ok(ApiResponse::page(
        "Products",
        items,
        Meta::new(total, page, limit),
    ))
}

pub async fn get_product(
    state: &AppState,
    id: Uuid,
    include_inactive: bool,
) -> AppResult<ApiResponse<Product>> {
    let mut finder = Products::find_by_id(id).filter(live(ProdCol::State));
    if !include_inactive {
        finder = finder.filter(ProdCol::IsActive.eq(true));
    }
    let model = finder
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let product = with_categories(&state.orm, model).await?;
    Ok(ApiResponse::success("Product", product, None))
}

/// Products of one category; the category itself must exist.
pub async fn products_by_category(
    state: &AppState,
    category_id: Uuid,
    mut query: ProductQuery,
    include_inactive: bool,
) -> AppResult<ApiResponse<Vec<Product>>> {
    Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    query.category_id = Some(category_id);
    list_products(state, query, include_inactive).await
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let title = required_text(form.title, "Title")?;
    let description = required_text(form.description, "Description")?;
    let price = form
        .price
        .ok_or_else(|| AppError::BadRequest("Price is required".into()))?;
    check_price(price)?;
    let image = form
        .image
        .ok_or_else(|| AppError::BadRequest("Image is required".into()))?;
    let category_ids = dedup_ids(form.category_ids.unwrap_or_default());

    ensure_categories_exist(&state.orm, &category_ids).await?;
    let image_path = store_file(&state.config.upload_dir, PRODUCT_UPLOAD_FOLDER, &image).await?;

    let txn = state.orm.begin().await?;
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        price: Set(price),
        description: Set(description),
        image: Set(Some(image_path)),
        is_active: Set(true),
        state: Set(EntityState::Active),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    link_categories(&txn, product.id, &category_ids).await?;
    txn.commit().await?;

    tracing::info!(product_id = %product.id, admin_id = %user.user_id, "product created");
    let product = with_categories(&state.orm, product).await?;
    Ok(ApiResponse::success("Product created", product, None))
}

/// Applies the fields present in the form; given category ids replace the current set.
pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let existing = Products::find_by_id(id)
        .filter(live(ProdCol::State))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let category_ids = form.category_ids.map(dedup_ids);
    if let Some(ids) = &category_ids {
        ensure_categories_exist(&state.orm, ids).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(title) = form.title {
        active.title = Set(required_text(Some(title), "Title")?);
    }
    if let Some(description) = form.description {
        active.description = Set(required_text(Some(description), "Description")?);
    }
    if let Some(price) = form.price {
        check_price(price)?;
        active.price = Set(price);
    }
    if let Some(image) = &form.image {
        let image_path =
            store_file(&state.config.upload_dir, PRODUCT_UPLOAD_FOLDER, image).await?;
        active.image = Set(Some(image_path));
    }

    let txn = state.orm.begin().await?;
    let product = active.update(&txn).await?;
    if let Some(ids) = &category_ids {
        ProductCategories::delete_many()
            .filter(ProductCategoryCol::ProductId.eq(product.id))
            .exec(&txn)
            .await?;
        link_categories(&txn, product.id, ids).await?;
    }
    txn.commit().await?;

    tracing::info!(product_id = %product.id, admin_id = %user.user_id, "product updated");
    let product = with_categories(&state.orm, product).await?;
    Ok(ApiResponse::success("Product updated", product, None))
}

/// Soft delete; the category links go away with it.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = Products::find_by_id(id)
        .filter(live(ProdCol::State))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    ProductCategories::delete_many()
        .filter(ProductCategoryCol::ProductId.eq(existing.id))
        .exec(&txn)
        .await?;

    let mut active: ActiveModel = existing.into();
    active.state = Set(EntityState::Deleted);
    let product = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(product_id = %product.id, admin_id = %user.user_id, "product deleted");
    Ok(ApiResponse::success(
        "Product deleted",
        Product::from(product),
        None,
    ))
}

/// Loads the categories of every product in one query and attaches them.
pub async fn attach_categories<C: ConnectionTrait>(
    db: &C,
    products: Vec<ProductModel>,
) -> AppResult<Vec<Product>> {
    if products.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let links = ProductCategories::find()
        .filter(ProductCategoryCol::ProductId.is_in(ids))
        .find_also_related(Categories)
        .order_by_asc(CategoryCol::Name)
        .all(db)
        .await?;

    let mut by_product: HashMap<Uuid, Vec<Category>> = HashMap::new();
    for (link, category) in links {
        if let Some(category) = category {
            by_product
                .entry(link.product_id)
                .or_default()
                .push(Category::from(category));
        }
    }

    Ok(products
        .into_iter()
        .map(|model| {
            let mut product = Product::from(model);
            product.categories = by_product.remove(&product.id).unwrap_or_default();
            product
        })
        .collect())
}

async fn with_categories<C: ConnectionTrait>(db: &C, model: ProductModel) -> AppResult<Product> {
    attach_categories(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Product"))
}

async fn ensure_categories_exist<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found = Categories::find()
        .filter(CategoryCol::Id.is_in(ids.to_vec()))
        .count(db)
        .await?;
    if found != ids.len() as u64 {
        return Err(AppError::not_found("Category"));
    }
    Ok(())
}

async fn link_categories<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    category_ids: &[Uuid],
) -> AppResult<()> {
    if category_ids.is_empty() {
        return Ok(());
    }
    let rows = category_ids.iter().map(|category_id| ProductCategoryActive {
        product_id: Set(product_id),
        category_id: Set(*category_id),
    });
    ProductCategories::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

fn dedup_ids(mut ids: Vec<Uuid>) -> Vec<Uuid> {
    ids.sort();
    ids.dedup();
    ids
}

fn required_text(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

pub fn check_price(price: Decimal) -> AppResult<()> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("Price must not be negative".into()));
    }
    if price > MAX_AMOUNT {
        return Err(AppError::BadRequest(format!(
            "Price must not exceed {MAX_AMOUNT}"
        )));
    }
    Ok(())
}
