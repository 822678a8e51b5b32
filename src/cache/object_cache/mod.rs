pub mod moka;
pub mod redis;

/// 注册内置缓存插件
pub fn register_builtin_plugins() {
    self::moka::register_plugin();
    self::redis::register_plugin();
}
