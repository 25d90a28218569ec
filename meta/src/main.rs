fn main() {
    multiversx_sc_meta_lib::cli_main::<lock_relay::AbiProvider>();
}
