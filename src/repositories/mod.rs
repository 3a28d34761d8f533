#[cfg(test)]
pub mod in_memory;
pub mod memo;

#[cfg(test)]
pub use in_memory::InMemoryMemoRepository;
pub use memo::{
    Category, Memo, MemoForm, MemoList, MemoLookup, MemoRepository, PostgresMemoRepository,
};
