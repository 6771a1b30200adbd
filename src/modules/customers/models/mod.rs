mod customer;

pub use customer::{
    validate_name, validate_phone, CreateCustomerRequest, Customer, CustomerCsvRow, NewCustomer,
    UpdateCustomerRequest,
};
