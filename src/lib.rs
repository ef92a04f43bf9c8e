pub mod config;
pub mod domain {
    pub mod decision;
    pub mod outcome;
    pub mod overrides;
    pub mod shipment;
}
pub mod gate;
pub mod http {
    pub mod handlers {
        pub mod decisions;
        pub mod learning;
        pub mod ops;
        pub mod outcomes;
        pub mod overrides;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
    pub mod routes;
}
pub mod learning;
pub mod overrides;
pub mod repo {
    pub mod decisions_repo;
    pub mod outcome_log_repo;
    pub mod override_ledger_repo;
    pub mod weights_repo;
}
pub mod risk;
pub mod service {
    pub mod dispatch_service;
    pub mod weights_store;
}
pub mod store;

#[derive(Clone)]
pub struct AppState {
    pub dispatch_service: service::dispatch_service::DispatchService,
    pub learning_window_days: i64,
}
