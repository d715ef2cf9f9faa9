pub mod core {
    pub mod data_type;
    pub mod value;
}

pub mod records {
    pub mod format;
    pub mod table;
}

pub mod execution {
    pub mod errors;
    pub mod outcome;
    pub mod plan;
    pub mod step;
}

pub mod source {
    pub mod kind;
}
