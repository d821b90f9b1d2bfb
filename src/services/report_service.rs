// src/services/report_service.rs

use chrono::{Duration, Utc};

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::{
        auth::{Capability, SessionContext},
        reports::{
            CategoryBreakdown, LowStockReport, MovementSummary, StockStatistics,
            SupplierBreakdown, ValuationEntry,
        },
    },
};

/// Fachada da camada de agregação, consumida por painéis e relatórios.
///
/// Somente leitura e sem cache: cada chamada consulta o estado commitado mais
/// recente do livro-razão.
#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
}

impl ReportService {
    pub fn new(repo: ReportRepository) -> Self {
        Self { repo }
    }

    /// Resumo do painel: contagens, quantidade total e valor do estoque.
    pub async fn stock_statistics(
        &self,
        ctx: &SessionContext<'_>,
    ) -> Result<StockStatistics, AppError> {
        ctx.ensure(Capability::ViewReports)?;
        self.repo.get_statistics(self.repo.pool()).await
    }

    /// Valorização por produto (quantidade × preço), maiores valores primeiro.
    pub async fn valuation_report(
        &self,
        ctx: &SessionContext<'_>,
    ) -> Result<Vec<ValuationEntry>, AppError> {
        ctx.ensure(Capability::ViewReports)?;
        self.repo.get_valuation(self.repo.pool()).await
    }

    pub async fn category_breakdown(
        &self,
        ctx: &SessionContext<'_>,
    ) -> Result<Vec<CategoryBreakdown>, AppError> {
        ctx.ensure(Capability::ViewReports)?;
        self.repo.get_category_breakdown(self.repo.pool()).await
    }

    pub async fn supplier_breakdown(
        &self,
        ctx: &SessionContext<'_>,
    ) -> Result<Vec<SupplierBreakdown>, AppError> {
        ctx.ensure(Capability::ViewReports)?;
        self.repo.get_supplier_breakdown(self.repo.pool()).await
    }

    /// Resumo de movimentações nos últimos `days` dias, opcionalmente
    /// restrito a um produto. `net = entradas - saídas`.
    pub async fn movement_summary(
        &self,
        ctx: &SessionContext<'_>,
        days: i64,
        product_id: Option<i64>,
    ) -> Result<MovementSummary, AppError> {
        ctx.ensure(Capability::ViewReports)?;

        let end_date = Utc::now();
        let start_date = end_date - Duration::days(days);

        let totals = self
            .repo
            .get_movement_totals(self.repo.pool(), start_date, product_id)
            .await?;

        Ok(MovementSummary {
            period_days: days,
            start_date,
            end_date,
            movements_in: totals.movements_in,
            movements_out: totals.movements_out,
            total_quantity_in: totals.total_quantity_in,
            total_quantity_out: totals.total_quantity_out,
            net_movement: totals.total_quantity_in - totals.total_quantity_out,
        })
    }

    /// Alertas de estoque baixo: críticos (quantidade zero) separados dos
    /// avisos, ambos ordenados do maior déficit para o menor.
    pub async fn low_stock_report(
        &self,
        ctx: &SessionContext<'_>,
    ) -> Result<LowStockReport, AppError> {
        ctx.ensure(Capability::ViewReports)?;

        let alerts = self.repo.get_low_stock_alerts(self.repo.pool()).await?;
        let total_alerts = alerts.len() as i64;
        let (critical, warning): (Vec<_>, Vec<_>) =
            alerts.into_iter().partition(|a| a.quantity == 0);

        Ok(LowStockReport {
            total_alerts,
            critical,
            warning,
        })
    }
}
