mod report;

pub use report::{
    CategoryBreakdown, CustomerPurchase, DateRangeQuery, SalesReport, SalesRow, SalesTotals,
};
