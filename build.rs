fn main() {
    cynic_codegen::register_schema("library")
        .from_sdl_file("schemas/library.graphql")
        .expect("schemas/library.graphql must exist")
        .as_default()
        .expect("failed to register the library schema");
}
