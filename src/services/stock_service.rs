// src/services/stock_service.rs

use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    common::{error::AppError, sku::generate_sku},
    db::InventoryRepository,
    models::{
        auth::{Capability, SessionContext},
        inventory::{
            Category, MovementType, NewCategory, NewProduct, NewSupplier, Product, ProductUpdate,
            StockMovement, StockMovementEntry, Supplier, SupplierUpdate,
        },
    },
};

/// Limite padrão do histórico de movimentações.
pub const DEFAULT_MOVEMENT_LIMIT: i64 = 100;

/// O motor do livro-razão de estoque: único caminho de escrita para produtos
/// e movimentações.
///
/// Toda operação recebe o [`SessionContext`] explicitamente; a permissão é
/// verificada antes de qualquer validação ou leitura. Mutações compostas
/// (linha de produto + linha de movimentação) rodam em uma única transação,
/// então uma falha parcial nunca deixa `quantity` fora de sincronia com a
/// soma das movimentações.
#[derive(Clone)]
pub struct StockService {
    repo: InventoryRepository,
    pool: SqlitePool,
}

impl StockService {
    pub fn new(repo: InventoryRepository, pool: SqlitePool) -> Self {
        Self { repo, pool }
    }

    // --- CRIAR PRODUTO ---
    /// Cria o produto e, se a quantidade inicial for positiva, a movimentação
    /// de entrada correspondente — as duas linhas na mesma transação.
    ///
    /// Sem SKU informado, gera um a partir do nome + categoria e falha com
    /// `DuplicateSku` em caso de colisão (sem regenerar).
    pub async fn create_product(
        &self,
        ctx: &SessionContext<'_>,
        input: NewProduct,
    ) -> Result<Product, AppError> {
        ctx.ensure(Capability::AddStock)?;
        input.validate()?;

        let sku = match &input.sku {
            Some(sku) => sku.clone(),
            None => {
                let category_name = match input.category_id {
                    Some(category_id) => self
                        .repo
                        .get_category_name(&self.pool, category_id)
                        .await?
                        .unwrap_or_default(),
                    None => String::new(),
                };
                generate_sku(&input.name, &category_name)
            }
        };

        // Checagem explícita antes do INSERT; a constraint UNIQUE cobre a
        // janela entre a checagem e a escrita.
        if self.repo.get_product_by_sku(&self.pool, &sku).await?.is_some() {
            return Err(AppError::DuplicateSku(sku));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let product = self.repo.insert_product(&mut *tx, &input, &sku, now).await?;

        if input.initial_quantity > 0 {
            self.repo
                .record_movement(
                    &mut *tx,
                    product.id,
                    MovementType::In,
                    input.initial_quantity,
                    Some("Initial stock"),
                    Some("Initial inventory"),
                    ctx.user_id,
                    now,
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            product_id = product.id,
            sku = %product.sku,
            initial_quantity = input.initial_quantity,
            "produto criado"
        );
        Ok(product)
    }

    // --- ATUALIZAR PRODUTO (campos de catálogo) ---
    /// Retorna `false` sem erro quando não há campos a alterar ou o id não
    /// existe. `quantity` fica fora deste caminho por construção.
    pub async fn update_product(
        &self,
        ctx: &SessionContext<'_>,
        product_id: i64,
        update: ProductUpdate,
    ) -> Result<bool, AppError> {
        ctx.ensure(Capability::EditStock)?;
        update.validate()?;

        if update.is_empty() {
            return Ok(false);
        }

        let rows = self
            .repo
            .update_product(&self.pool, product_id, &update, Utc::now())
            .await?;
        Ok(rows > 0)
    }

    // --- REMOVER PRODUTO ---
    /// Só remove produtos sem nenhuma movimentação; com histórico, devolve
    /// `false` em vez de erro (o chamador apenas informa que não dá).
    pub async fn delete_product(
        &self,
        ctx: &SessionContext<'_>,
        product_id: i64,
    ) -> Result<bool, AppError> {
        ctx.ensure(Capability::DeleteStock)?;

        match self.repo.delete_product(&self.pool, product_id).await {
            Ok(rows) => Ok(rows > 0),
            Err(AppError::HasMovementHistory) => {
                tracing::warn!(product_id, "remoção bloqueada: produto possui movimentações");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // --- AJUSTE DE ESTOQUE ---
    /// Leva a quantidade ao valor informado e registra a movimentação de
    /// reconciliação (entrada ou saída de |delta|) na mesma transação.
    /// Ajustar para a quantidade atual é um no-op que retorna sucesso.
    ///
    /// Valor alvo negativo falha com `InvalidQuantity`, o erro específico de
    /// quantidade; `ValidationError` fica reservado à validação de DTOs na
    /// borda de criação/atualização.
    ///
    /// Limitação conhecida: o delta é calculado a partir da leitura feita na
    /// própria transação; dois ajustes concorrentes no mesmo produto seguem a
    /// semântica last-write-wins do SQLite (escritores serializados).
    pub async fn adjust_stock(
        &self,
        ctx: &SessionContext<'_>,
        product_id: i64,
        new_quantity: i64,
        reason: Option<&str>,
    ) -> Result<bool, AppError> {
        ctx.ensure(Capability::EditStock)?;

        if new_quantity < 0 {
            return Err(AppError::InvalidQuantity(new_quantity));
        }

        let mut tx = self.pool.begin().await?;

        let product = self
            .repo
            .get_product_by_id(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let delta = new_quantity - product.quantity;
        if delta == 0 {
            // Nada a reconciliar; nenhuma movimentação é registrada.
            return Ok(true);
        }

        let now = Utc::now();
        self.repo
            .set_product_quantity(&mut *tx, product_id, new_quantity, now)
            .await?;

        let movement_type = if delta > 0 {
            MovementType::In
        } else {
            MovementType::Out
        };
        self.repo
            .record_movement(
                &mut *tx,
                product_id,
                movement_type,
                delta.abs(),
                Some("adjustment"),
                Some(reason.unwrap_or("Stock adjustment")),
                ctx.user_id,
                now,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            product_id,
            from = product.quantity,
            to = new_quantity,
            "estoque ajustado"
        );
        Ok(true)
    }

    // --- REGISTRAR MOVIMENTAÇÃO (primitiva) ---
    /// Append puro no livro-razão: não altera `products.quantity`. Manter a
    /// projeção em sincronia é responsabilidade da operação de nível superior
    /// que decidiu a nova quantidade (criação e ajuste fazem isso na mesma
    /// transação).
    pub async fn record_movement(
        &self,
        ctx: &SessionContext<'_>,
        product_id: i64,
        movement_type: MovementType,
        quantity: i64,
        reference_id: Option<&str>,
        notes: Option<&str>,
    ) -> Result<StockMovement, AppError> {
        ctx.ensure(Capability::EditStock)?;

        if quantity <= 0 {
            return Err(AppError::InvalidQuantity(quantity));
        }
        if self
            .repo
            .get_product_by_id(&self.pool, product_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound);
        }

        self.repo
            .record_movement(
                &self.pool,
                product_id,
                movement_type,
                quantity,
                reference_id,
                notes,
                ctx.user_id,
                Utc::now(),
            )
            .await
    }

    // ---
    // Consultas do motor
    // ---

    pub async fn get_product(
        &self,
        ctx: &SessionContext<'_>,
        product_id: i64,
    ) -> Result<Option<Product>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo.get_product_by_id(&self.pool, product_id).await
    }

    pub async fn get_product_by_sku(
        &self,
        ctx: &SessionContext<'_>,
        sku: &str,
    ) -> Result<Option<Product>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo.get_product_by_sku(&self.pool, sku).await
    }

    /// Lista produtos por nome, com busca textual (nome/SKU/descrição) e
    /// filtro de categoria opcionais.
    pub async fn get_all_products(
        &self,
        ctx: &SessionContext<'_>,
        search: Option<&str>,
        category_id: Option<i64>,
    ) -> Result<Vec<Product>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo
            .get_all_products(&self.pool, search, category_id)
            .await
    }

    /// Produtos com quantidade <= nível mínimo, mais deficitários primeiro.
    pub async fn get_low_stock_products(
        &self,
        ctx: &SessionContext<'_>,
    ) -> Result<Vec<Product>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo.get_low_stock_products(&self.pool).await
    }

    /// Histórico de movimentações, mais recentes primeiro. Sem `product_id`
    /// vira o feed global; `limit` padrão de [`DEFAULT_MOVEMENT_LIMIT`].
    pub async fn get_movements(
        &self,
        ctx: &SessionContext<'_>,
        product_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<StockMovementEntry>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo
            .get_movements(
                &self.pool,
                product_id,
                limit.unwrap_or(DEFAULT_MOVEMENT_LIMIT),
            )
            .await
    }

    // ---
    // Categorias
    // ---

    pub async fn create_category(
        &self,
        ctx: &SessionContext<'_>,
        input: NewCategory,
    ) -> Result<Category, AppError> {
        ctx.ensure(Capability::EditStock)?;
        input.validate()?;
        self.repo
            .create_category(&self.pool, &input, Utc::now())
            .await
    }

    pub async fn get_categories(
        &self,
        ctx: &SessionContext<'_>,
    ) -> Result<Vec<Category>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo.get_all_categories(&self.pool).await
    }

    // ---
    // Fornecedores
    // ---

    pub async fn create_supplier(
        &self,
        ctx: &SessionContext<'_>,
        input: NewSupplier,
    ) -> Result<Supplier, AppError> {
        ctx.ensure(Capability::AddStock)?;
        input.validate()?;
        self.repo
            .create_supplier(&self.pool, &input, Utc::now())
            .await
    }

    pub async fn get_supplier(
        &self,
        ctx: &SessionContext<'_>,
        supplier_id: i64,
    ) -> Result<Option<Supplier>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo.get_supplier_by_id(&self.pool, supplier_id).await
    }

    pub async fn get_suppliers(
        &self,
        ctx: &SessionContext<'_>,
        search: Option<&str>,
    ) -> Result<Vec<Supplier>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo.get_all_suppliers(&self.pool, search).await
    }

    /// Retorna `false` sem erro quando não há campos a alterar ou o id não
    /// existe, como na atualização de produto.
    pub async fn update_supplier(
        &self,
        ctx: &SessionContext<'_>,
        supplier_id: i64,
        update: SupplierUpdate,
    ) -> Result<bool, AppError> {
        ctx.ensure(Capability::EditStock)?;
        update.validate()?;

        if update.is_empty() {
            return Ok(false);
        }

        let rows = self
            .repo
            .update_supplier(&self.pool, supplier_id, &update)
            .await?;
        Ok(rows > 0)
    }

    /// Produtos vinculados a um fornecedor, em ordem de nome.
    pub async fn get_supplier_products(
        &self,
        ctx: &SessionContext<'_>,
        supplier_id: i64,
    ) -> Result<Vec<Product>, AppError> {
        ctx.ensure(Capability::ViewStock)?;
        self.repo
            .get_products_by_supplier(&self.pool, supplier_id)
            .await
    }

    /// Remoção bloqueada (erro `SupplierHasProducts`) enquanto algum produto
    /// referenciar o fornecedor.
    pub async fn delete_supplier(
        &self,
        ctx: &SessionContext<'_>,
        supplier_id: i64,
    ) -> Result<bool, AppError> {
        ctx.ensure(Capability::DeleteStock)?;
        let rows = self.repo.delete_supplier(&self.pool, supplier_id).await?;
        Ok(rows > 0)
    }
}
