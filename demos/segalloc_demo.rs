//! Manual walkthrough of the allocator, useful for watching the process
//! break move under `pmap`/`htop`/`gdb` while each step runs. Pauses between
//! steps and prints the program break via `sbrk(0)` at each one, exercising
//! `alloc`/`free`/`realloc`/`zalloc` and a forced heap extension.

use std::io::Read;

use segalloc::Allocator;

fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_break(label: &str) {
  println!("[{label}] program break (sbrk(0)) = {:?}", segalloc::heap::current_break());
}

fn main() {
  env_logger::init();

  let mut allocator = Allocator::empty();
  allocator.init().expect("failed to initialize heap");

  print_break("start");
  block_until_enter_pressed();

  // 1) A small allocation.
  let a = allocator.alloc(12);
  println!("\n[1] alloc(12) -> {a:?}");
  unsafe { (a as *mut u32).write(0xDEADBEEF) };
  block_until_enter_pressed();

  // 2) A second allocation, to observe low-address splitting.
  let b = allocator.alloc(32);
  println!("\n[2] alloc(32) -> {b:?}");
  block_until_enter_pressed();

  // 3) free(a): should coalesce with nothing (b sits after it, allocated).
  allocator.free(a);
  println!("\n[3] free(a) at {a:?}");
  block_until_enter_pressed();

  // 4) realloc(b, 4096): grows into a new block, copies, frees the old one.
  let grown = allocator.realloc(b, 4096);
  println!("\n[4] realloc(b, 4096) -> {grown:?}");
  block_until_enter_pressed();

  // 5) zalloc(16, 8): 128 zeroed bytes.
  let z = allocator.zalloc(16, 8);
  println!("\n[5] zalloc(16, 8) -> {z:?}");
  let all_zero = (0..128).all(|i| unsafe { z.add(i).read() } == 0);
  println!("[5] all zero? {all_zero}");
  block_until_enter_pressed();

  // 6) A request bigger than one chunk, forcing a heap extension.
  print_break("before large alloc");
  let big = allocator.alloc(64 * 1024);
  println!("\n[6] alloc(64 KiB) -> {big:?}");
  print_break("after large alloc");
  block_until_enter_pressed();

  allocator.check().expect("heap should be consistent at the end of the demo");
  println!("\n[7] Invariant check passed. End of demo.");
}
