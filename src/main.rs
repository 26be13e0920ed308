fn main() -> std::process::ExitCode {
    ko_hover::main_entry()
}
