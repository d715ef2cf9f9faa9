pub mod file {
    pub mod csv {
        pub mod error;
        pub mod loader;
    }
}

pub mod session {
    pub mod entry;
    pub mod store;
}

pub mod sql {
    pub mod base {
        pub mod error;
        pub mod remote;
        pub mod row;
    }

    pub mod postgres {
        pub mod adapter;
        pub mod utils;
    }

    pub mod analytic {
        pub mod context;
        pub mod encoder;
    }
}

pub use session::store::TableStore;
pub use sql::base::remote::RemoteStore;
pub use sql::postgres::adapter::PgRemoteStore;
