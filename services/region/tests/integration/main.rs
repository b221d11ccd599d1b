mod apply_test;
mod helpers;
mod replication_test;
mod router_test;
