use crate::models::seat::SeatClass;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ClassRevenue {
    pub class: SeatClass,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DashboardReport {
    pub orders_by_status: Vec<StatusCount>,
    pub flights_by_status: Vec<StatusCount>,
    pub revenue: Decimal,
    pub cancelled_orders: i64,
    pub revenue_by_class: Vec<ClassRevenue>,
}
