use crate::models::report::DashboardReport;
use crate::store::SharedStore;
use crate::utils::error::AppResult;

// Read-only aggregates for the admin dashboard
#[derive(Clone)]
pub struct ReportService {
    store: SharedStore,
}

impl ReportService {
    pub fn new(store: SharedStore) -> Self {
        ReportService { store }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardReport> {
        Ok(DashboardReport {
            orders_by_status: self.store.order_status_counts().await?,
            flights_by_status: self.store.flight_status_counts().await?,
            revenue: self.store.active_revenue().await?,
            cancelled_orders: self.store.cancelled_order_count().await?,
            revenue_by_class: self.store.revenue_by_class().await?,
        })
    }
}
