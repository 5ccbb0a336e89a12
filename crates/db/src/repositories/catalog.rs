//! Catalog repository: categories, suppliers, products, variants and customers.
//!
//! The catalog is plain reference data. The only rule with teeth is that a
//! variant is always created with zero stock; its counter is owned by the
//! stock ledger from then on.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use stockbook_shared::AppError;
use stockbook_shared::types::{CategoryId, CustomerId, ProductId, SupplierId, VariantId};

use crate::entities::{
    categories, customers, product_variants, products, sea_orm_active_enums::CategoryType,
    suppliers,
};

/// Reorder level given to variants created without one.
pub const DEFAULT_REORDER_LEVEL: i32 = 5;

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Referenced record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Name already taken.
    #[error("{0} already exists")]
    Duplicate(String),

    /// Input failed validation.
    #[error("Invalid input: {0}")]
    Invalid(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CatalogError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Duplicate(_) => "DUPLICATE",
            Self::Invalid(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Duplicate(_) => 409,
            Self::Invalid(_) => 400,
            Self::Database(_) => 500,
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(what) => Self::NotFound(what),
            CatalogError::Duplicate(what) => Self::Conflict(format!("{what} already exists")),
            CatalogError::Invalid(msg) => Self::Validation(msg),
            CatalogError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Unique name.
    pub name: String,
    /// Category type.
    pub category_type: CategoryType,
    /// Description.
    pub description: Option<String>,
}

/// Input for creating a supplier.
#[derive(Debug, Clone, Default)]
pub struct CreateSupplierInput {
    /// Unique name.
    pub name: String,
    /// Contact person.
    pub contact_person: Option<String>,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Address.
    pub address: Option<String>,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Owning category.
    pub category_id: CategoryId,
    /// Optional supplier.
    pub supplier_id: Option<SupplierId>,
    /// Name, unique within the category.
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

/// Input for creating a variant.
#[derive(Debug, Clone)]
pub struct CreateVariantInput {
    /// Owning product.
    pub product_id: ProductId,
    /// Name, unique within the product.
    pub name: String,
    /// Unit price in the smallest currency unit.
    pub unit_price: i64,
    /// Reorder level, defaults to [`DEFAULT_REORDER_LEVEL`].
    pub reorder_level: Option<i32>,
}

/// Input for creating a customer.
#[derive(Debug, Clone, Default)]
pub struct CreateCustomerInput {
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Address.
    pub address: Option<String>,
}

fn require_name(name: &str, what: &str) -> Result<(), CatalogError> {
    if name.trim().is_empty() {
        return Err(CatalogError::Invalid(format!("{what} name is required")));
    }
    Ok(())
}

fn is_blank(value: Option<&String>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Catalog repository for reference data.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken, `Invalid` for a blank name.
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<categories::Model, CatalogError> {
        require_name(&input.name, "Category")?;

        let existing = categories::Entity::find()
            .filter(categories::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::Duplicate(format!("Category '{}'", input.name)));
        }

        let category = categories::ActiveModel {
            id: Set(CategoryId::new().into_inner()),
            name: Set(input.name),
            category_type: Set(input.category_type),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(category.insert(&self.db).await?)
    }

    /// Lists categories by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_categories(&self) -> Result<Vec<categories::Model>, CatalogError> {
        Ok(categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Creates a supplier.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the name is taken, `Invalid` for a blank name.
    pub async fn create_supplier(
        &self,
        input: CreateSupplierInput,
    ) -> Result<suppliers::Model, CatalogError> {
        require_name(&input.name, "Supplier")?;

        let existing = suppliers::Entity::find()
            .filter(suppliers::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::Duplicate(format!("Supplier '{}'", input.name)));
        }

        let supplier = suppliers::ActiveModel {
            id: Set(SupplierId::new().into_inner()),
            name: Set(input.name),
            contact_person: Set(input.contact_person),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(supplier.insert(&self.db).await?)
    }

    /// Lists suppliers by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_suppliers(&self) -> Result<Vec<suppliers::Model>, CatalogError> {
        Ok(suppliers::Entity::find()
            .order_by_asc(suppliers::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Creates a product under a category.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The category or supplier does not exist
    /// - The name is blank or already used in the category
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<products::Model, CatalogError> {
        require_name(&input.name, "Product")?;

        categories::Entity::find_by_id(input.category_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Category {}", input.category_id)))?;

        if let Some(supplier_id) = input.supplier_id {
            suppliers::Entity::find_by_id(supplier_id.into_inner())
                .one(&self.db)
                .await?
                .ok_or_else(|| CatalogError::NotFound(format!("Supplier {supplier_id}")))?;
        }

        let existing = products::Entity::find()
            .filter(products::Column::CategoryId.eq(input.category_id.into_inner()))
            .filter(products::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::Duplicate(format!("Product '{}'", input.name)));
        }

        let product = products::ActiveModel {
            id: Set(ProductId::new().into_inner()),
            category_id: Set(input.category_id.into_inner()),
            supplier_id: Set(input.supplier_id.map(SupplierId::into_inner)),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(product.insert(&self.db).await?)
    }

    /// Lists products, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_products(
        &self,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<products::Model>, CatalogError> {
        let mut query = products::Entity::find().order_by_asc(products::Column::Name);
        if let Some(category_id) = category_id {
            query = query.filter(products::Column::CategoryId.eq(category_id.into_inner()));
        }
        Ok(query.all(&self.db).await?)
    }

    /// Creates a variant with zero stock.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The product does not exist
    /// - The name is blank or already used in the product
    /// - The price is below 1 or the reorder level is negative
    pub async fn create_variant(
        &self,
        input: CreateVariantInput,
    ) -> Result<product_variants::Model, CatalogError> {
        require_name(&input.name, "Variant")?;
        if input.unit_price < 1 {
            return Err(CatalogError::Invalid(
                "unit price must be at least 1".to_string(),
            ));
        }
        let reorder_level = input.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL);
        if reorder_level < 0 {
            return Err(CatalogError::Invalid(
                "reorder level must not be negative".to_string(),
            ));
        }

        products::Entity::find_by_id(input.product_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Product {}", input.product_id)))?;

        let existing = product_variants::Entity::find()
            .filter(product_variants::Column::ProductId.eq(input.product_id.into_inner()))
            .filter(product_variants::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::Duplicate(format!("Variant '{}'", input.name)));
        }

        let now = chrono::Utc::now().into();
        let variant = product_variants::ActiveModel {
            id: Set(VariantId::new().into_inner()),
            product_id: Set(input.product_id.into_inner()),
            name: Set(input.name),
            unit_price: Set(input.unit_price),
            stock_quantity: Set(0),
            reorder_level: Set(reorder_level),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(variant.insert(&self.db).await?)
    }

    /// Finds a variant by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the variant does not exist.
    pub async fn get_variant(
        &self,
        variant_id: VariantId,
    ) -> Result<product_variants::Model, CatalogError> {
        product_variants::Entity::find_by_id(variant_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Variant {variant_id}")))
    }

    /// Activates or retires a variant. Stock is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the variant does not exist.
    pub async fn set_variant_active(
        &self,
        variant_id: VariantId,
        is_active: bool,
    ) -> Result<product_variants::Model, CatalogError> {
        let variant = self.get_variant(variant_id).await?;

        let mut active: product_variants::ActiveModel = variant.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Creates a customer. Either an email or a phone number is required.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a blank name or missing contact details.
    pub async fn create_customer(
        &self,
        input: CreateCustomerInput,
    ) -> Result<customers::Model, CatalogError> {
        if input.first_name.trim().is_empty() || input.last_name.trim().is_empty() {
            return Err(CatalogError::Invalid(
                "first and last name are required".to_string(),
            ));
        }
        if is_blank(input.email.as_ref()) && is_blank(input.phone.as_ref()) {
            return Err(CatalogError::Invalid(
                "either email or phone is required".to_string(),
            ));
        }

        let customer = customers::ActiveModel {
            id: Set(CustomerId::new().into_inner()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };
        Ok(customer.insert(&self.db).await?)
    }

    /// Lists customers by last name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_customers(&self) -> Result<Vec<customers::Model>, CatalogError> {
        Ok(customers::Entity::find()
            .order_by_asc(customers::Column::LastName)
            .order_by_asc(customers::Column::FirstName)
            .all(&self.db)
            .await?)
    }
}
