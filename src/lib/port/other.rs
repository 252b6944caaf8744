// no portable way to see other processes' handles
pub fn is_port_open(_port_name: &str) -> bool {
    false
}
