pub mod data {
    pub mod bridge {
        pub mod callback_bridge;
        pub mod native_reply_sink;
    }
    pub mod datasources {
        pub mod native_store_datasource;
        pub(crate) mod server_validation_datasource;
    }
    pub mod models {
        pub mod native_store {
            pub mod native_message_model;
            pub mod native_product_model;
            pub mod native_purchase_model;
        }
        pub(crate) mod server_validation {
            pub(crate) mod verify_purchases_model;
        }
    }
    pub mod repositories {
        pub mod native_store_backend;
        pub mod server_validation_handler;
    }
}

pub mod domain {
    pub mod entities {
        pub mod iap_provider;
        pub mod product;
        pub mod purchase;
        pub mod purchase_event;
        pub mod store_error;
    }
    pub mod handlers {
        pub mod purchase_observer;
        pub mod validation_handler;
    }
    pub mod repositories {
        pub mod store_backend;
    }
}

pub mod config;
pub mod constants;
pub mod errors;
pub mod observer_registry;
pub mod product_id_mapper;
pub mod provider_selector;
pub mod purchase_service;
