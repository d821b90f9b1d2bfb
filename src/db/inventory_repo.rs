// src/db/inventory_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Acquire, Executor, QueryBuilder, Sqlite};

use crate::{
    common::error::AppError,
    models::inventory::{
        Category, MovementType, NewCategory, NewProduct, NewSupplier, Product, ProductUpdate,
        StockMovement, StockMovementEntry, Supplier, SupplierUpdate,
    },
};

// Sem estado próprio: todo método recebe o executor (pool ou transação) de
// quem chama, então é o serviço que decide o escopo transacional.
#[derive(Clone, Copy, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Categorias
    // ---

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        input: &NewCategory,
        now: DateTime<Utc>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::CategoryNameAlreadyExists(input.name.clone());
                }
            }
            e.into()
        })
    }

    pub async fn get_all_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
                .fetch_all(executor)
                .await?;
        Ok(categories)
    }

    pub async fn get_category_name<'e, E>(
        &self,
        executor: E,
        category_id: i64,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(executor)
            .await?;
        Ok(name)
    }

    // ---
    // Fornecedores
    // ---

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        input: &NewSupplier,
        now: DateTime<Utc>,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, email, phone, address, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn get_supplier_by_id<'e, E>(
        &self,
        executor: E,
        supplier_id: i64,
    ) -> Result<Option<Supplier>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?")
            .bind(supplier_id)
            .fetch_optional(executor)
            .await?;
        Ok(supplier)
    }

    pub async fn get_all_suppliers<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
    ) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM suppliers WHERE 1=1");
        if let Some(term) = search {
            let like = format!("%{term}%");
            qb.push(" AND (name LIKE ")
                .push_bind(like.clone())
                .push(" OR email LIKE ")
                .push_bind(like.clone())
                .push(" OR phone LIKE ")
                .push_bind(like)
                .push(")");
        }
        qb.push(" ORDER BY name ASC");

        let suppliers = qb.build_query_as::<Supplier>().fetch_all(executor).await?;
        Ok(suppliers)
    }

    /// Atualização parcial. Exige ao menos um campo preenchido; o serviço
    /// descarta atualizações vazias antes de chegar aqui.
    pub async fn update_supplier<'e, E>(
        &self,
        executor: E,
        supplier_id: i64,
        update: &SupplierUpdate,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE suppliers SET ");
        {
            let mut fields = qb.separated(", ");
            if let Some(name) = &update.name {
                fields.push("name = ").push_bind_unseparated(name);
            }
            if let Some(email) = &update.email {
                fields.push("email = ").push_bind_unseparated(email);
            }
            if let Some(phone) = &update.phone {
                fields.push("phone = ").push_bind_unseparated(phone);
            }
            if let Some(address) = &update.address {
                fields.push("address = ").push_bind_unseparated(address);
            }
        }
        qb.push(" WHERE id = ").push_bind(supplier_id);

        let rows = qb.build().execute(executor).await?.rows_affected();
        Ok(rows)
    }

    pub async fn get_products_by_supplier<'e, E>(
        &self,
        executor: E,
        supplier_id: i64,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE supplier_id = ? ORDER BY name ASC",
        )
        .bind(supplier_id)
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    /// Remove um fornecedor, desde que nenhum produto o referencie.
    /// A guarda referencial bloqueia a remoção, não faz cascata.
    pub async fn delete_supplier<'e, E>(
        &self,
        executor: E,
        supplier_id: i64,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite> + Acquire<'e, Database = Sqlite>,
    {
        let mut tx = executor.begin().await?;

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE supplier_id = ?")
                .bind(supplier_id)
                .fetch_one(&mut *tx)
                .await?;
        if references > 0 {
            return Err(AppError::SupplierHasProducts);
        }

        let rows = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(supplier_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(rows)
    }

    // ---
    // Produtos
    // ---

    pub async fn insert_product<'e, E>(
        &self,
        executor: E,
        input: &NewProduct,
        sku: &str,
        now: DateTime<Utc>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products
                (name, category_id, sku, description, unit_price, quantity,
                 min_stock_level, supplier_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(input.category_id)
        .bind(sku)
        .bind(&input.description)
        .bind(input.unit_price)
        .bind(input.initial_quantity)
        .bind(input.min_stock_level)
        .bind(input.supplier_id)
        .bind(now)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                // O SQLite não expõe o nome da constraint; a mensagem traz
                // "UNIQUE constraint failed: products.sku".
                if db_err.is_unique_violation() && db_err.message().contains("products.sku") {
                    return AppError::DuplicateSku(sku.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn get_product_by_id<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn get_product_by_sku<'e, E>(
        &self,
        executor: E,
        sku: &str,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = ?")
            .bind(sku)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    pub async fn get_all_products<'e, E>(
        &self,
        executor: E,
        search: Option<&str>,
        category_id: Option<i64>,
    ) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM products WHERE 1=1");
        if let Some(term) = search {
            let like = format!("%{term}%");
            qb.push(" AND (name LIKE ")
                .push_bind(like.clone())
                .push(" OR sku LIKE ")
                .push_bind(like.clone())
                .push(" OR description LIKE ")
                .push_bind(like)
                .push(")");
        }
        if let Some(cid) = category_id {
            qb.push(" AND category_id = ").push_bind(cid);
        }
        qb.push(" ORDER BY name ASC");

        let products = qb.build_query_as::<Product>().fetch_all(executor).await?;
        Ok(products)
    }

    /// Atualização parcial dos campos de catálogo. `quantity` nunca passa por
    /// aqui: quantidade só muda junto com uma movimentação, pelo serviço.
    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        update: &ProductUpdate,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE products SET ");
        {
            let mut fields = qb.separated(", ");
            if let Some(name) = &update.name {
                fields.push("name = ").push_bind_unseparated(name);
            }
            if let Some(category_id) = update.category_id {
                fields
                    .push("category_id = ")
                    .push_bind_unseparated(category_id);
            }
            if let Some(sku) = &update.sku {
                fields.push("sku = ").push_bind_unseparated(sku);
            }
            if let Some(description) = &update.description {
                fields
                    .push("description = ")
                    .push_bind_unseparated(description);
            }
            if let Some(unit_price) = update.unit_price {
                fields
                    .push("unit_price = ")
                    .push_bind_unseparated(unit_price);
            }
            if let Some(min_stock_level) = update.min_stock_level {
                fields
                    .push("min_stock_level = ")
                    .push_bind_unseparated(min_stock_level);
            }
            if let Some(supplier_id) = update.supplier_id {
                fields
                    .push("supplier_id = ")
                    .push_bind_unseparated(supplier_id);
            }
            // Toda atualização bem-sucedida carimba updated_at.
            fields.push("updated_at = ").push_bind_unseparated(now);
        }
        qb.push(" WHERE id = ").push_bind(product_id);

        let rows = qb
            .build()
            .execute(executor)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() && db_err.message().contains("products.sku") {
                        return AppError::DuplicateSku(update.sku.clone().unwrap_or_default());
                    }
                }
                e.into()
            })?
            .rows_affected();
        Ok(rows)
    }

    /// Grava a nova quantidade materializada. Chamar SEMPRE na mesma transação
    /// que `record_movement`: em falha parcial o invariante
    /// quantidade == Σ movimentações quebraria.
    pub async fn set_product_quantity<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let rows = sqlx::query("UPDATE products SET quantity = ?, updated_at = ? WHERE id = ?")
            .bind(quantity)
            .bind(now)
            .bind(product_id)
            .execute(executor)
            .await?
            .rows_affected();
        Ok(rows)
    }

    pub async fn count_movements<'e, E>(
        &self,
        executor: E,
        product_id: i64,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE product_id = ?")
                .bind(product_id)
                .fetch_one(executor)
                .await?;
        Ok(count)
    }

    /// Remove um produto, desde que ele nunca tenha sido movimentado — o
    /// histórico do livro-razão não pode ficar órfão.
    pub async fn delete_product<'e, E>(&self, executor: E, product_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite> + Acquire<'e, Database = Sqlite>,
    {
        let mut tx = executor.begin().await?;

        if self.count_movements(&mut *tx, product_id).await? > 0 {
            return Err(AppError::HasMovementHistory);
        }

        let rows = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(rows)
    }

    // ---
    // Movimentações (livro-razão)
    // ---

    /// Acrescenta uma linha ao livro-razão. Primitiva de append puro: NÃO mexe
    /// em products.quantity — essa responsabilidade é da operação de nível
    /// superior, que decidiu a nova quantidade materializada.
    pub async fn record_movement<'e, E>(
        &self,
        executor: E,
        product_id: i64,
        movement_type: MovementType,
        quantity: i64,
        reference_id: Option<&str>,
        notes: Option<&str>,
        user_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements
                (product_id, movement_type, quantity, reference_id, notes, user_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(movement_type)
        .bind(quantity)
        .bind(reference_id)
        .bind(notes)
        .bind(user_id)
        .bind(now)
        .fetch_one(executor)
        .await?;
        Ok(movement)
    }

    /// Histórico de movimentações, mais recentes primeiro. Sem filtro de
    /// produto vira o feed global de atividade recente.
    pub async fn get_movements<'e, E>(
        &self,
        executor: E,
        product_id: Option<i64>,
        limit: i64,
    ) -> Result<Vec<StockMovementEntry>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let mut qb = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT sm.id, sm.product_id, sm.movement_type, sm.quantity,
                   sm.reference_id, sm.notes, sm.user_id, sm.created_at,
                   p.name AS product_name, p.sku
            FROM stock_movements sm
            JOIN products p ON sm.product_id = p.id
            WHERE 1=1
            "#,
        );
        if let Some(pid) = product_id {
            qb.push(" AND sm.product_id = ").push_bind(pid);
        }
        // Desempate por id para manter ordem estável entre linhas gravadas no
        // mesmo instante.
        qb.push(" ORDER BY sm.created_at DESC, sm.id DESC LIMIT ")
            .push_bind(limit);

        let movements = qb
            .build_query_as::<StockMovementEntry>()
            .fetch_all(executor)
            .await?;
        Ok(movements)
    }

    /// Produtos em estoque baixo, do mais deficitário para o menos; nome como
    /// desempate.
    pub async fn get_low_stock_products<'e, E>(&self, executor: E) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE quantity <= min_stock_level
            ORDER BY (quantity - min_stock_level) ASC, name ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(products)
    }
}
