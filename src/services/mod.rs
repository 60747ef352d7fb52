pub mod seed_data;
