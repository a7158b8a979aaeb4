//! Generated protocol buffer types for Terraform Plugin Protocol v6
//!
//! The code is generated at build time from `proto/tfplugin6.proto`. Several
//! protobuf messages share names with framework types (`DynamicValue`,
//! `Diagnostic`, `Schema`), so always refer to them through `proto::tfplugin6`.

pub mod tfplugin6 {
    tonic::include_proto!("tfplugin6");
}
