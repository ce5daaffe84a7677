// Panic hook, console logging and timing helpers

#[cfg(target_arch = "wasm32")]
use web_sys::console;

pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// Console output only exists in the browser, off wasm the message is formatted and dropped
#[macro_export]
macro_rules! log {
    ( $( $t:tt )* ) => {
        $crate::utils::console_log(&format!( $( $t )* ))
    }
}

#[macro_export]
macro_rules! warning {
    ( $( $t:tt )* ) => {
        $crate::utils::console_warn(&format!( $( $t )* ))
    }
}

#[doc(hidden)]
pub fn console_log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    console::log_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

#[doc(hidden)]
pub fn console_warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    console::warn_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

// Scoped console.time / console.timeEnd pair, only active with the `profiling` feature
pub struct Timer<'a> {
    name: &'a str,
}

impl<'a> Timer<'a> {
    pub fn new(name: &'a str) -> Timer<'a> {
        #[cfg(all(target_arch = "wasm32", feature = "profiling"))]
        console::time_with_label(name);
        Timer { name }
    }
}

impl<'a> Drop for Timer<'a> {
    fn drop(&mut self) {
        #[cfg(all(target_arch = "wasm32", feature = "profiling"))]
        console::time_end_with_label(self.name);
        #[cfg(not(all(target_arch = "wasm32", feature = "profiling")))]
        let _ = self.name;
    }
}
