pub mod dashboard;
pub mod form;
pub mod item_list;
pub mod login;
pub mod modals;
pub mod models;
pub mod project_details;
pub mod register;
pub mod session;
pub mod storage;
pub mod task_modal;
pub mod ui;
